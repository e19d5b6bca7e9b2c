use crate::invocation::{Invocation, RunOptions};

/// Flags appended to every invocation of a host's build driver.
#[derive(Debug, Clone, Copy)]
pub struct DriverFlags {
	/// Exact executable name of the build driver.
	pub executable: &'static str,

	/// Flags appended after the caller's arguments, in order.
	pub flags: &'static [&'static str],
}

/// Host-specific data the built-in rewrite rules operate on.
#[derive(Debug, Clone, Copy)]
pub struct RewriteProfile {
	/// Executables known to be runnable even though no file by that name
	/// exists on disk. Matched by exact name.
	pub relaxed_executables: &'static [&'static str],

	/// Build driver that needs extra flags on this host.
	pub build_driver: Option<DriverFlags>,

	/// This host's binaries folder as a path substring, e.g. `/Binaries/Linux/`.
	pub native_binaries_marker: &'static str,

	/// Other hosts' binaries folders that get translated to the native one.
	pub foreign_binaries_markers: &'static [&'static str],

	/// Substrings removed from translated binary paths, in order.
	pub stripped_suffixes: &'static [&'static str],

	/// Generic executable suffix (`.exe`).
	pub executable_suffix: &'static str,

	/// Runtime used to launch managed applications, if any.
	pub interpreter: Option<&'static str>,
}

impl RewriteProfile {
	/// Whether `executable` contains the native or a foreign binaries folder.
	pub fn references_binaries_folder(&self, executable: &str) -> bool {
		executable.contains(self.native_binaries_marker)
			|| self
				.foreign_binaries_markers
				.iter()
				.any(|marker| executable.contains(marker))
	}

	/// Whether binary paths need any translation on this host at all.
	pub fn translates_binary_paths(&self) -> bool {
		!self.foreign_binaries_markers.is_empty() || !self.stripped_suffixes.is_empty()
	}
}

/// Built-in rewrite rules. Evaluated in [`RewriteRule::ORDERED`] order, each
/// seeing the output of the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteRule {
	RelaxExistenceCheck,
	InjectDriverFlags,
	TranslateBinaryPath,
	SubstituteInterpreter,
}

impl RewriteRule {
	pub const ORDERED: [RewriteRule; 4] = [
		RewriteRule::RelaxExistenceCheck,
		RewriteRule::InjectDriverFlags,
		RewriteRule::TranslateBinaryPath,
		RewriteRule::SubstituteInterpreter,
	];

	pub fn name(&self) -> &'static str {
		match self {
			RewriteRule::RelaxExistenceCheck => "relax-existence-check",
			RewriteRule::InjectDriverFlags => "inject-driver-flags",
			RewriteRule::TranslateBinaryPath => "translate-binary-path",
			RewriteRule::SubstituteInterpreter => "substitute-interpreter",
		}
	}

	pub fn matches(&self, invocation: &Invocation, profile: &RewriteProfile) -> bool {
		let exe = invocation.executable.as_str();
		match self {
			RewriteRule::RelaxExistenceCheck => {
				profile.relaxed_executables.iter().any(|name| *name == exe)
			}
			RewriteRule::InjectDriverFlags => profile
				.build_driver
				.is_some_and(|driver| driver.executable == exe),
			RewriteRule::TranslateBinaryPath => {
				profile.translates_binary_paths()
					&& profile.references_binaries_folder(exe)
					&& (exe.ends_with(profile.executable_suffix) || has_no_extension(exe))
			}
			RewriteRule::SubstituteInterpreter => {
				profile.interpreter.is_some()
					&& exe.ends_with(profile.executable_suffix)
					&& !profile.references_binaries_folder(exe)
			}
		}
	}

	/// Apply the transformation. Callers check [`RewriteRule::matches`] first.
	pub fn apply(&self, mut invocation: Invocation, profile: &RewriteProfile) -> Invocation {
		match self {
			RewriteRule::RelaxExistenceCheck => {
				invocation.options.remove(RunOptions::APP_MUST_EXIST);
			}
			RewriteRule::InjectDriverFlags => {
				if let Some(driver) = profile.build_driver {
					invocation.append_arguments(&driver.flags.join(" "));
				}
			}
			RewriteRule::TranslateBinaryPath => {
				let mut exe = invocation.executable;
				for marker in profile.foreign_binaries_markers {
					exe = exe.replace(marker, profile.native_binaries_marker);
				}
				for suffix in profile.stripped_suffixes {
					exe = exe.replace(suffix, "");
				}
				invocation.executable = exe;
			}
			RewriteRule::SubstituteInterpreter => {
				if let Some(interpreter) = profile.interpreter {
					let mut arguments = format!("\"{}\"", invocation.executable);
					if !invocation.arguments.is_empty() {
						arguments.push(' ');
						arguments.push_str(&invocation.arguments);
					}
					invocation.executable = interpreter.to_string();
					invocation.arguments = arguments;
					invocation.options.remove(RunOptions::APP_MUST_EXIST);
				}
			}
		}
		invocation
	}
}

/// True when the file name has no `.` or ends with one. A leading `.` still
/// starts an extension, so `.tool` has one.
fn has_no_extension(executable: &str) -> bool {
	let file_name = executable.rsplit(['/', '\\']).next().unwrap_or(executable);
	file_name
		.rfind('.')
		.is_none_or(|dot| dot + 1 == file_name.len())
}

#[cfg(test)]
mod tests {
	use super::*;

	const PROFILE: RewriteProfile = RewriteProfile {
		relaxed_executables: &["sh", "xbuild", "codesign"],
		build_driver: Some(DriverFlags {
			executable: "xbuild",
			flags: &["/verbosity:quiet", "/nologo"],
		}),
		native_binaries_marker: "/Binaries/Linux/",
		foreign_binaries_markers: &["/Binaries/Win64/"],
		stripped_suffixes: &["-cmd.exe", "-Cmd.exe", ".exe"],
		executable_suffix: ".exe",
		interpreter: Some("mono"),
	};

	fn inv(exe: &str, args: &str) -> Invocation {
		Invocation::new(exe, args, RunOptions::DEFAULT)
	}

	#[test]
	fn test_relax_matches_exact_name_only() {
		let rule = RewriteRule::RelaxExistenceCheck;
		assert!(rule.matches(&inv("sh", ""), &PROFILE));
		assert!(rule.matches(&inv("codesign", ""), &PROFILE));
		assert!(!rule.matches(&inv("/bin/sh", ""), &PROFILE));
		assert!(!rule.matches(&inv("SH", ""), &PROFILE));
	}

	#[test]
	fn test_driver_flags_appended_after_arguments() {
		let rule = RewriteRule::InjectDriverFlags;
		let out = rule.apply(inv("xbuild", "/target:Build"), &PROFILE);
		assert_eq!(out.arguments, "/target:Build /verbosity:quiet /nologo");
		assert_eq!(out.options, RunOptions::DEFAULT);
	}

	#[test]
	fn test_driver_flags_with_empty_arguments() {
		let out = RewriteRule::InjectDriverFlags.apply(inv("xbuild", ""), &PROFILE);
		assert_eq!(out.arguments, "/verbosity:quiet /nologo");
	}

	#[test]
	fn test_translate_requires_exe_suffix_or_no_extension() {
		let rule = RewriteRule::TranslateBinaryPath;
		assert!(rule.matches(&inv("/ue/Engine/Binaries/Win64/UnrealPak.exe", ""), &PROFILE));
		assert!(rule.matches(&inv("/ue/Engine/Binaries/Linux/UnrealPak", ""), &PROFILE));
		assert!(!rule.matches(&inv("/ue/Engine/Binaries/Linux/run.sh", ""), &PROFILE));
		assert!(!rule.matches(&inv("/ue/Engine/Tools/UnrealPak.exe", ""), &PROFILE));
	}

	#[test]
	fn test_translate_disabled_without_foreign_markers() {
		let profile = RewriteProfile {
			native_binaries_marker: "/Binaries/Win64/",
			foreign_binaries_markers: &[],
			stripped_suffixes: &[],
			..PROFILE
		};
		assert!(!RewriteRule::TranslateBinaryPath.matches(
			&inv("C:/ue/Engine/Binaries/Win64/UnrealPak.exe", ""),
			&profile
		));
	}

	#[test]
	fn test_translate_strips_cmd_variants() {
		let rule = RewriteRule::TranslateBinaryPath;
		let out = rule.apply(inv("/ue/Engine/Binaries/Win64/UE4Editor-Cmd.exe", ""), &PROFILE);
		assert_eq!(out.executable, "/ue/Engine/Binaries/Linux/UE4Editor");

		let out = rule.apply(inv("/ue/Engine/Binaries/Win64/UE4Editor-cmd.exe", ""), &PROFILE);
		assert_eq!(out.executable, "/ue/Engine/Binaries/Linux/UE4Editor");
	}

	#[test]
	fn test_translate_is_case_sensitive_on_markers() {
		assert!(!RewriteRule::TranslateBinaryPath.matches(
			&inv("/ue/Engine/binaries/win64/Tool.exe", ""),
			&PROFILE
		));
	}

	#[test]
	fn test_interpreter_quotes_original_executable() {
		let rule = RewriteRule::SubstituteInterpreter;
		let out = rule.apply(inv("Foo.exe", "-run"), &PROFILE);
		assert_eq!(out.executable, "mono");
		assert_eq!(out.arguments, "\"Foo.exe\" -run");
		assert!(!out.options.contains(RunOptions::APP_MUST_EXIST));
		assert!(out.options.contains(RunOptions::ALLOW_SPEW));
	}

	#[test]
	fn test_interpreter_without_arguments() {
		let out = RewriteRule::SubstituteInterpreter.apply(inv("Tool.exe", ""), &PROFILE);
		assert_eq!(out.arguments, "\"Tool.exe\"");
	}

	#[test]
	fn test_interpreter_skipped_without_runtime() {
		let profile = RewriteProfile {
			interpreter: None,
			..PROFILE
		};
		assert!(!RewriteRule::SubstituteInterpreter.matches(&inv("Foo.exe", ""), &profile));
	}

	#[test]
	fn test_has_no_extension() {
		assert!(has_no_extension("/ue/Engine/Binaries/Linux/UnrealPak"));
		assert!(has_no_extension("trailing."));
		assert!(!has_no_extension("Tool.exe"));
		assert!(!has_no_extension("/a.b/run.sh"));
		assert!(has_no_extension("/a.b/run"));
		assert!(!has_no_extension(".tool"));
		assert!(!has_no_extension(r"C:\ue\Engine\Binaries\Win64\.tool"));
	}

	#[test]
	fn test_translate_skips_dotfiles() {
		assert!(!RewriteRule::TranslateBinaryPath.matches(
			&inv("/ue/Engine/Binaries/Win64/.tool", ""),
			&PROFILE
		));
	}
}
