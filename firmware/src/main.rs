// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]
#![feature(asm_experimental_arch)]

mod adc;
mod dio;
mod hw;
mod log;
mod spi;
mod system;
mod tasks;
mod timer;
mod uart;

use crate::{
    hw::{Peripherals, Sreg, mcu, unwrap_option},
    log::info,
    spi::Spi,
    system::{delay_us, reset_cause, reset_cpu, wdt_init, wdt_poke},
    tasks::{DISPATCHER, PIN_LED, TICK},
    timer::{Pwm, Timer0},
};
use afrsys::{
    IrqNest, RelTicks,
    pin::{Pin, PinMode},
    reset::ResetCause,
};
use avr_context::{InitCtx, MainCtx};

/// Digital input, reported once per second.
const PIN_INPUT: Pin = Pin::PC0;
/// Initial PWM duty of both channels.
const PWM_DUTY: u8 = 127;
/// Sent over SPI once per second.
const SPI_PING: u8 = 0x01;
/// UART command byte that resets the CPU.
const CMD_RESET: u8 = b'r';

#[allow(non_snake_case)]
struct InitPeriph {
    ADC: mcu::ADC,
    CPU: mcu::CPU,
    PORTB: mcu::PORTB,
    PORTC: mcu::PORTC,
    PORTD: mcu::PORTD,
    SPI: mcu::SPI,
    TC0: mcu::TC0,
    TC1: mcu::TC1,
    USART: mcu::USART,
}

struct MainPeriph {
    spi: Spi,
    pwm: Pwm,
    wdt: mcu::WDT,
}

struct Startup {
    periph: MainPeriph,
    reset: ResetCause,
}

fn init(c: &InitCtx<'_>, (dp, wdt): (InitPeriph, mcu::WDT)) -> Startup {
    let cs = c.cs();

    dio::init(cs, dp.PORTB, dp.PORTC, dp.PORTD);
    dio::set_mode(cs, PIN_LED, PinMode::Output);
    dio::write(cs, PIN_LED, false);
    dio::set_mode(cs, Pin::PB1, PinMode::Output); // OC1A
    dio::set_mode(cs, Pin::PB2, PinMode::Output); // OC1B
    dio::set_mode(cs, PIN_INPUT, PinMode::Input);

    uart::init(cs, dp.USART);
    uart::setup(cs);
    let spi = Spi::new(cs, dp.SPI);

    let pwm = Pwm::new(dp.TC1);
    pwm.set_duty_a(PWM_DUTY);
    pwm.set_duty_b(PWM_DUTY);

    adc::init(cs, dp.ADC);
    timer::init(cs, dp.TC0);

    Startup {
        periph: MainPeriph {
            spi,
            pwm,
            wdt,
        },
        reset: reset_cause(&dp.CPU),
    }
}

#[avr_device::entry]
fn main() -> ! {
    wdt_init();

    let dp = unwrap_option(Peripherals::take());

    // Interrupts are still masked after reset.
    // Keep them masked until everything is set up.
    let irq = IrqNest::new(Sreg);
    irq.disable();

    let ip = InitPeriph {
        ADC: dp.ADC,
        CPU: dp.CPU,
        PORTB: dp.PORTB,
        PORTC: dp.PORTC,
        PORTD: dp.PORTD,
        SPI: dp.SPI,
        TC0: dp.TC0,
        TC1: dp.TC1,
        USART: dp.USART,
    };

    // SAFETY:
    // This is the context handle for the main() function.
    // Holding a reference to this object proves that the holder
    // is running in main() context.
    let (m, startup) = unsafe { MainCtx::new_with_init(init, (ip, dp.WDT)) };

    irq.free(|cs| DISPATCHER.init(cs, &TICK, &Timer0));
    irq.enable();

    uart::send_str("AfrSys\r\n");
    info!(&m, "{}", startup.reset);
    let table = DISPATCHER.table();
    for task in table.tasks() {
        info!(&m, "Task every {} ms", task.period().ticks());
    }
    info!(&m, "Hyperperiod {} ms", table.hyperperiod());

    main_loop(&m, &irq, startup.periph)
}

fn main_loop(m: &MainCtx<'_>, irq: &IrqNest<Sreg>, mp: MainPeriph) -> ! {
    let mut last_report = irq.free(|cs| TICK.elapsed(cs));
    loop {
        if let Some((now, adc, input)) = irq.free(|cs| {
            tasks::second_passed(cs).then(|| {
                (
                    TICK.elapsed(cs),
                    tasks::adc_value(cs),
                    dio::read(cs, PIN_INPUT),
                )
            })
        }) {
            let dist: RelTicks = now - last_report;
            last_report = now;
            info!(m, "1 second passed (tick {}, +{})", now, dist);
            info!(m, "ADC VAL : {} IN : {}", adc, input as u8);
            if let Err(e) = mp.spi.transfer(SPI_PING) {
                info!(m, "{}", e);
            }
        }

        while let Some(byte) = irq.free(uart::read_byte) {
            info!(m, "RX: {}", byte as char);
            if byte == CMD_RESET {
                mp.pwm.off();
                // Let the last byte leave the shift register.
                delay_us(2000);
                reset_cpu();
            }
        }

        wdt_poke(&mp.wdt);
    }
}

// vim: ts=4 sw=4 expandtab
