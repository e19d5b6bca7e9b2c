/// Initialize the logger with the specified verbosity level.
///
/// `RUST_LOG` takes precedence when set.
///
/// # Arguments
/// * `verbose` - Verbosity level (0=warn, 1=info, 2=debug, 3+=trace)
pub fn setup_logger(verbose: u8) {
	let env_filter = match verbose {
		0 => "hostrun=warn,hostrun_cli=warn",
		1 => "hostrun=info,hostrun_cli=info",
		2 => "hostrun=debug,hostrun_cli=debug",
		_ => "hostrun=trace,hostrun_cli=trace",
	};

	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(env_filter))
		.format_timestamp(None)
		.format_module_path(false)
		.format_target(false)
		.init();
}
