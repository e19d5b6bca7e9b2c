//! Process launch boundary for hostrun.
//!
//! This module handles:
//! - Resolving the rewritten executable and enforcing `APP_MUST_EXIST`
//! - Splitting the raw argument string into argv
//! - Injecting host launch environment and spawning with inherited stdio
//! - Interrupt-handler registration on hosts that support it

use crate::error::{HostrunError, Result};
use crate::host::{CtrlHandlerSupport, HostPlatform};
use crate::invocation::{Invocation, RunOptions};
use log::{debug, info, warn};
use signal_hook::consts::signal::SIGINT;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

/// How a launched process ended up.
#[derive(Debug)]
pub enum LaunchOutcome {
	/// The process ran to completion.
	Exited(ExitStatus),

	/// `NO_WAIT_FOR_EXIT` was set; the process keeps running.
	Detached { pid: u32 },
}

/// Resolve a command name to its full path.
///
/// Absolute paths are returned if they exist. Names containing a path
/// separator resolve against `cwd`. Bare names are searched on PATH.
pub fn resolve_command(command: &str, cwd: &Path) -> Option<PathBuf> {
	let path = Path::new(command);

	if path.is_absolute() {
		return path.exists().then(|| path.to_path_buf());
	}

	if path.components().count() > 1 {
		let full_path = cwd.join(path);
		return full_path.exists().then_some(full_path);
	}

	which::which(command).ok()
}

/// Split a raw argument string into discrete arguments using POSIX shell
/// quoting rules.
pub fn split_arguments(arguments: &str) -> Result<Vec<String>> {
	shlex::split(arguments).ok_or_else(|| HostrunError::MalformedArguments {
		arguments: arguments.to_string(),
	})
}

/// Join discrete arguments into a raw argument string, quoting as needed.
pub fn join_arguments(args: &[String]) -> Result<String> {
	shlex::try_join(args.iter().map(String::as_str)).map_err(|_| {
		HostrunError::MalformedArguments {
			arguments: args.join(" "),
		}
	})
}

/// Build the process command for an already rewritten invocation.
///
/// Environment variables the host requests for the executable are added on
/// top of the inherited environment. Bare names are left for the OS to find
/// on PATH so the child sees the name it was asked for as `argv[0]`.
pub fn prepare_command(
	platform: &HostPlatform,
	invocation: &Invocation,
	cwd: &Path,
) -> Result<Command> {
	let options = invocation.options;
	let resolved = resolve_command(&invocation.executable, cwd);

	if options.contains(RunOptions::APP_MUST_EXIST) && resolved.is_none() {
		return Err(HostrunError::CommandNotFound {
			command: invocation.executable.clone(),
		});
	}

	let program = match resolved {
		Some(path) if Path::new(&invocation.executable).components().count() > 1 => path,
		_ => PathBuf::from(&invocation.executable),
	};
	let args = split_arguments(&invocation.arguments)?;
	let environment = platform.descriptor().launch_environment(&invocation.executable);

	if !options.contains(RunOptions::NO_LOGGING_OF_RUN_COMMAND) {
		info!("Running: {} {}", program.display(), invocation.arguments);
	}
	for (key, value) in &environment {
		debug!("Setting {key}={value}");
	}

	let stdin = if options.contains(RunOptions::ALLOW_MISSING_STDIN) {
		Stdio::null()
	} else {
		Stdio::inherit()
	};

	let mut cmd = Command::new(&program);
	cmd.args(&args)
		.current_dir(cwd)
		.envs(environment)
		.stdin(stdin)
		.stdout(Stdio::inherit())
		.stderr(Stdio::inherit());
	Ok(cmd)
}

/// Launch an already rewritten invocation.
pub fn launch(platform: &HostPlatform, invocation: &Invocation, cwd: &Path) -> Result<LaunchOutcome> {
	let options = invocation.options;
	let mut cmd = prepare_command(platform, invocation, cwd)?;

	let started = Instant::now();
	let mut child = cmd.spawn().map_err(|source| {
		if source.kind() == std::io::ErrorKind::NotFound {
			HostrunError::CommandNotFound {
				command: invocation.executable.clone(),
			}
		} else {
			HostrunError::CommandFailed {
				command: invocation.executable.clone(),
				source,
			}
		}
	})?;

	if options.contains(RunOptions::NO_WAIT_FOR_EXIT) {
		return Ok(LaunchOutcome::Detached { pid: child.id() });
	}

	let status = child.wait().map_err(|source| HostrunError::CommandFailed {
		command: invocation.executable.clone(),
		source,
	})?;

	if !options.contains(RunOptions::NO_LOGGING_OF_RUN_DURATION) {
		info!(
			"{} took {:.2}s",
			invocation.executable,
			started.elapsed().as_secs_f64()
		);
	}

	Ok(LaunchOutcome::Exited(status))
}

/// Narrow a child's exit code to a process exit byte.
///
/// Codes that do not fit, and a missing code (killed by a signal), become 1
/// so a failing child never reports success.
pub fn exit_code_byte(code: Option<i32>) -> u8 {
	code.map_or(1, |code| u8::try_from(code).unwrap_or(1))
}

/// Ask the host to raise `flag` on Ctrl+C.
///
/// Returns `Ok(false)` without doing anything on hosts with
/// [`CtrlHandlerSupport::Unsupported`].
pub fn register_ctrl_handler(platform: &HostPlatform, flag: Arc<AtomicBool>) -> Result<bool> {
	match platform.descriptor().ctrl_handler() {
		CtrlHandlerSupport::Unsupported => {
			debug!(
				"Interrupt handler registration is a no-op on {}",
				platform.kind()
			);
			Ok(false)
		}
		CtrlHandlerSupport::Native => {
			signal_hook::flag::register(SIGINT, flag).map_err(|source| {
				warn!("Failed to register interrupt handler: {source}");
				HostrunError::CtrlHandlerFailed { source }
			})?;
			Ok(true)
		}
	}
}
