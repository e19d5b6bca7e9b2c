use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hostrun_cli::config::{
	CONFIG_FILE_NAME, MergedConfig, detect_user_folders, discover_configs, init_template,
	load_merged_config, user_config_path,
};
use hostrun_cli::exec::{
	LaunchOutcome, exit_code_byte, join_arguments, launch, register_ctrl_handler,
};
use hostrun_cli::host::{CtrlHandlerSupport, HostDescriptor, HostKind, HostPlatform, HostRegistry};
use hostrun_cli::invocation::{Invocation, RunOptions};
use hostrun_cli::logging;
use hostrun_cli::rules::compile_rules;
use log::warn;

/// Exit code reported when SIGINT arrived while the child was running.
const INTERRUPTED_EXIT_CODE: u8 = 130;

#[derive(Parser)]
#[command(name = "hostrun")]
#[command(
	author,
	version,
	about = "Adapt build commands to the host they run on"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbose: u8,

	/// Act as this host (windows, macos, linux) instead of the configured or running one
	#[arg(long, global = true, value_name = "KIND")]
	host: Option<String>,

	/// Create a template .hostrun.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing .hostrun.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,

	#[command(subcommand)]
	command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
	/// Show the active host descriptor
	Info,
	/// Print the invocation this host would actually run
	Rewrite {
		#[command(flatten)]
		request: InvocationArgs,

		/// List the rules that fired
		#[arg(long)]
		explain: bool,
	},
	/// Rewrite a command for this host and run it
	Run {
		#[command(flatten)]
		request: InvocationArgs,
	},
	/// Print the path of a build-tool executable under the local root
	Locate {
		/// Executable name, e.g. UnrealPak
		name: String,
	},
	/// Print which of the given process names cleanup may terminate
	Reap {
		/// Candidate process names
		#[arg(required = true)]
		names: Vec<String>,
	},
	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display merged effective configuration with source annotations
	Show,
	/// Check all config files for errors without running anything
	Validate,
}

#[derive(Args)]
struct InvocationArgs {
	/// Run option to set, repeatable (e.g. app-must-exist, allow-missing-stdin)
	#[arg(short = 'o', long = "option", value_name = "FLAG")]
	options: Vec<RunOptions>,

	/// Start from no run options instead of allow-spew|app-must-exist
	#[arg(long)]
	no_default_options: bool,

	/// Executable to run
	executable: String,

	/// Arguments passed to the executable
	#[arg(trailing_var_arg = true, allow_hyphen_values = true)]
	args: Vec<String>,
}

impl InvocationArgs {
	fn to_invocation(&self) -> Result<Invocation> {
		let base = if self.no_default_options {
			RunOptions::NONE
		} else {
			RunOptions::DEFAULT
		};
		let options = self.options.iter().fold(base, |acc, flag| acc | *flag);
		let arguments = join_arguments(&self.args).context("Failed to quote arguments")?;
		Ok(Invocation::new(&self.executable, arguments, options))
	}
}

/// Everything a subcommand needs once the host is chosen.
struct Session {
	platform: HostPlatform,
	config: MergedConfig,
	cwd: PathBuf,
}

impl Session {
	fn open(host_override: Option<&str>) -> Result<Self> {
		let cwd = std::env::current_dir().context("Failed to get current directory")?;
		let config = load_merged_config(&cwd).context("Failed to load configuration")?;

		let kind = match (host_override, config.host) {
			(Some(name), _) => name.parse::<HostKind>()?,
			(None, Some(kind)) => kind,
			(None, None) => HostKind::from_os(std::env::consts::OS)?,
		};

		let folders = detect_user_folders().context("Failed to resolve user folders")?;
		let mut registry = HostRegistry::builtin(&folders);
		registry.register(
			HostDescriptor::builtin(kind, &folders)
				.with_protected_processes(config.protected_processes.iter().cloned()),
		);

		let rules = compile_rules(&config).context("Failed to compile rules")?;
		let platform = registry
			.activate_with_rules(kind, rules)
			.context("Failed to activate host platform")?;

		Ok(Session {
			platform,
			config,
			cwd,
		})
	}

	fn local_root(&self) -> &Path {
		self.config.local_root.as_deref().unwrap_or(&self.cwd)
	}
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	logging::setup_logger(cli.verbose);

	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run(cli: Cli) -> Result<ExitCode> {
	if cli.init {
		return handle_init(cli.force);
	}

	let host = cli.host.as_deref();
	match cli.command {
		Some(Commands::Info) => handle_info(&Session::open(host)?),
		Some(Commands::Rewrite { request, explain }) => {
			handle_rewrite(&Session::open(host)?, &request, explain)
		}
		Some(Commands::Run { request }) => handle_run(&Session::open(host)?, &request),
		Some(Commands::Locate { name }) => handle_locate(&Session::open(host)?, &name),
		Some(Commands::Reap { names }) => handle_reap(&Session::open(host)?, &names),
		Some(Commands::Config { action }) => match action {
			ConfigAction::Show => handle_config_show(),
			ConfigAction::Validate => handle_config_validate(),
		},
		// Unreachable with arg_required_else_help unless only -v/--host were given
		None => Ok(ExitCode::SUCCESS),
	}
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(CONFIG_FILE_NAME);

	if config_path.exists() && !force {
		anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
	}

	std::fs::write(&config_path, init_template())
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {CONFIG_FILE_NAME}");
	Ok(ExitCode::SUCCESS)
}

fn handle_info(session: &Session) -> Result<ExitCode> {
	let d = session.platform.descriptor();

	println!("host: {}", d.kind());
	println!("binaries folder: {}", d.binaries_folder());
	println!("local root: {}", session.local_root().display());
	println!("build log folder: {}", d.local_build_log_folder().display());
	println!(
		"version control client: {}",
		d.version_control_client_path().display()
	);
	println!("debug symbol extension: {}", d.debug_symbol_extension());
	println!("build tool project: {}", d.build_tool_project());
	println!("build driver: {}", d.build_driver_executable());
	println!("ide: {}", d.ide_executable().unwrap_or("(none)"));
	println!("editor host: {}", d.editor_host_kind());
	let ctrl = match d.ctrl_handler() {
		CtrlHandlerSupport::Native => "native",
		CtrlHandlerSupport::Unsupported => "unsupported",
	};
	println!("interrupt handler: {ctrl}");
	println!(
		"protected processes: {}",
		d.protected_process_names().join(", ")
	);
	println!(
		"configured rules: {}",
		session.platform.rewriter().configured_rules().len()
	);

	Ok(ExitCode::SUCCESS)
}

fn handle_rewrite(session: &Session, request: &InvocationArgs, explain: bool) -> Result<ExitCode> {
	let outcome = session.platform.rewrite_traced(request.to_invocation()?);
	let inv = &outcome.invocation;

	println!("executable: {}", inv.executable);
	println!("arguments: {}", inv.arguments);
	println!("options: {}", inv.options);
	if explain {
		if outcome.applied.is_empty() {
			println!("rules: (none)");
		} else {
			println!("rules: {}", outcome.applied.join(", "));
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_run(session: &Session, request: &InvocationArgs) -> Result<ExitCode> {
	let invocation = session.platform.rewrite(request.to_invocation()?);

	let interrupted = Arc::new(AtomicBool::new(false));
	register_ctrl_handler(&session.platform, Arc::clone(&interrupted))
		.context("Failed to register interrupt handler")?;

	let outcome = launch(&session.platform, &invocation, &session.cwd)
		.with_context(|| format!("Failed to execute: {}", invocation.executable))?;

	if interrupted.load(Ordering::Relaxed) {
		warn!("Interrupted while running {}", invocation.executable);
		return Ok(ExitCode::from(INTERRUPTED_EXIT_CODE));
	}

	match outcome {
		LaunchOutcome::Exited(status) => Ok(ExitCode::from(exit_code_byte(status.code()))),
		LaunchOutcome::Detached { pid } => {
			println!("started {} (pid {pid})", invocation.executable);
			Ok(ExitCode::SUCCESS)
		}
	}
}

fn handle_locate(session: &Session, name: &str) -> Result<ExitCode> {
	let path = session
		.platform
		.descriptor()
		.build_tool_executable_path(session.local_root(), name);
	println!("{}", path.display());
	Ok(ExitCode::SUCCESS)
}

fn handle_reap(session: &Session, names: &[String]) -> Result<ExitCode> {
	let eligible = session
		.platform
		.descriptor()
		.processes_eligible_for_termination(names.iter().map(String::as_str));
	for name in eligible {
		println!("{name}");
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_config_show() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let configs = discover_configs(&cwd).context("Failed to discover config files")?;

	if configs.is_empty() {
		println!("No configuration files found.");
		return Ok(ExitCode::SUCCESS);
	}

	println!("Configuration files (in cascade order):\n");

	for loaded in &configs {
		let config = &loaded.config;
		println!("# Source: {}", loaded.path.display());
		println!("# root: {}", config.root);
		if let Some(ref env_var) = config.root_config_lookup_disable_env_var {
			println!("# root-config-lookup-disable-env-var: {env_var}");
		}
		if let Some(ref host) = config.host {
			println!("# host: {host}");
		}
		if let Some(ref root) = config.local_root {
			println!("# local-root: {}", root.display());
		}
		if !config.protected_processes.is_empty() {
			println!(
				"# protected-processes: {}",
				config.protected_processes.join(", ")
			);
		}
		println!("# rules: {}", config.rules.len());
		println!();

		for (i, rule) in config.rules.iter().enumerate() {
			println!("  Rule {}:", i + 1);
			if let Some(ref host) = rule.host {
				println!("    host: {host}");
			}
			if let Some(ref pattern) = rule.executable_pattern {
				println!("    executable_pattern: {pattern}");
			}
			if let Some(ref pattern) = rule.arguments_pattern {
				println!("    arguments_pattern: {pattern}");
			}
			if let Some(ref rewrite) = rule.executable_rewrite {
				println!("    executable_rewrite: {rewrite}");
			}
			if let Some(ref rewrite) = rule.arg_rewrite {
				println!("    arg_rewrite: {rewrite}");
			}
			if rule.relax_must_exist {
				println!("    relax_must_exist: true");
			}
			println!();
		}
	}

	if let Ok(user_path) = user_config_path() {
		println!("User config path: {}", user_path.display());
		if user_path.exists() {
			println!("  (exists)");
		} else {
			println!("  (not found)");
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;

	let result = load_merged_config(&cwd).and_then(|merged| compile_rules(&merged).map(|_| ()));
	if let Err(e) = result {
		eprintln!("Configuration error: {e}");
		return Ok(ExitCode::FAILURE);
	}

	let configs = discover_configs(&cwd).context("Failed to discover config files")?;
	if configs.is_empty() {
		println!("No configuration files found.");
	} else {
		println!("All configuration files are valid:");
		for loaded in &configs {
			println!(
				"  {} ({} rules)",
				loaded.path.display(),
				loaded.config.rules.len()
			);
		}
	}
	Ok(ExitCode::SUCCESS)
}
