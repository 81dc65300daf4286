// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! A console logger for applications and tests using the codec.

use std::{
    fmt,
    io::Write,
    sync::atomic::{AtomicBool, Ordering},
};

use env_logger::{
    fmt::{Color, Style},
    Builder,
};

/// Environment variable holding the filter, e.g. `OPCUA_CODEC_LOG=opcua_codec=debug,hex=trace`
const LOG_ENV: &str = "OPCUA_CODEC_LOG";

struct Pad<T> {
    value: T,
    width: usize,
}

impl<T: fmt::Display> fmt::Display for Pad<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{: <width$}", self.value, width = self.width)
    }
}

fn level_style(style: &mut Style, level: log::Level) {
    match level {
        log::Level::Error => {
            style.set_color(Color::White).set_bg(Color::Red);
        }
        log::Level::Warn => {
            style.set_color(Color::Yellow);
        }
        log::Level::Info => {
            style.set_color(Color::Cyan);
        }
        log::Level::Debug => {
            style.set_color(Color::Green);
        }
        log::Level::Trace => {
            style.set_color(Color::Ansi256(8));
        }
    }
}

/// Installs the console logger. Filtering is read from `OPCUA_CODEC_LOG` rather than `RUST_LOG` so
/// output from other tools using env_logger is not mixed in. Calling this more than once does
/// nothing.
pub fn init() {
    lazy_static! {
        static ref INITIALISED: AtomicBool = AtomicBool::new(false);
    }

    if INITIALISED.swap(true, Ordering::Relaxed) {
        return;
    }

    let mut builder = Builder::from_env(LOG_ENV);
    builder.format(|f, record| {
        let time_fmt = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");

        let mut style = f.style();
        level_style(&mut style, record.level());
        let level = style.value(Pad {
            value: record.level(),
            width: 5,
        });

        let mut style = f.style();
        let target = style.set_bold(true).value(Pad {
            value: record.target(),
            width: 32,
        });

        writeln!(f, "{} {} {} {}", time_fmt, level, target, record.args())
    });
    if let Err(err) = builder.try_init() {
        eprintln!("Console logging cannot be installed, {}", err);
    } else {
        info!(
            "Logging is enabled, use the {} environment variable to control filtering",
            LOG_ENV
        );
    }
}
