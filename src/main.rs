use clap::Parser;
use log::debug;
use std::io;
use std::process;

use dnsquery::config::{Args, Config};
use dnsquery::render;

fn main() {
    env_logger::init();

    let config = Config::from(Args::parse());
    debug!("{:?}", config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let rendered = render::write_request(&mut out, &config).and_then(|_| {
        match dnsquery::resolve(&config) {
            Ok(response) => render::write_response(&mut out, &response).map(|_| true),
            Err(err) => render::write_error(&mut out, &err).map(|_| false),
        }
    });

    match rendered {
        Ok(true) => (),
        Ok(false) => process::exit(1),
        Err(err) => {
            eprintln!("failed to write output: {}", err);
            process::exit(2);
        }
    }
}
