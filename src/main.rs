extern crate ffdnet_rust;
#[macro_use]
extern crate log;

use ffdnet_rust::{cli, commands, logging};

fn main() {
	logging::init_simple_logger();

	let app_m = cli::build_cli();

	if let Err(err) = commands::run(&app_m) {
		error!("Error: {}", err);
		std::process::exit(1);
	}
}
