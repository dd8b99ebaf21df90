use clap::{ArgAction, ArgGroup, Parser};
use lkup_core::logs::{LogFormat, LogSource};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "lkup",
    version,
    about = "lkup: group web server log entries by client address and look up who they are",
    disable_version_flag = true,
    group(ArgGroup::new("log").args(["access", "other", "error", "file"]))
)]
pub struct Cli {
    /// Access log (stdin locally, access.log with -r)
    #[arg(short = 'a')]
    pub access: bool,

    /// The small "other" access log
    #[arg(short = 'o')]
    pub other: bool,

    /// Apache error log
    #[arg(short = 'e')]
    pub error: bool,

    /// Access-format log file to read
    pub file: Option<String>,

    /// Fetch the selected log from the configured server
    #[arg(short = 'r')]
    pub remote: bool,

    /// Path to the config file (default: ~/.lkup/lkup.config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Don't print lookup progress to stderr
    #[arg(long)]
    pub no_progress: bool,

    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,
}

/// Which log to read and how to parse it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub name: String,
    pub format: LogFormat,
}

impl Cli {
    /// `None` when no log was selected.
    pub fn selection(&self) -> Option<Selection> {
        let (name, format) = if self.access {
            ("access.log".to_string(), LogFormat::Access)
        } else if self.other {
            ("small.log".to_string(), LogFormat::Access)
        } else if self.error {
            ("error.log".to_string(), LogFormat::Error)
        } else {
            (self.file.clone()?, LogFormat::Access)
        };

        Some(Selection { name, format })
    }

    pub fn source(&self, selection: &Selection, server: &str) -> LogSource {
        if self.remote {
            LogSource::Remote {
                server: server.to_string(),
                name: selection.name.clone(),
            }
        } else if self.access {
            LogSource::Stdin
        } else {
            LogSource::File(PathBuf::from(&selection.name))
        }
    }

    /// Progress is drawn only on a terminal, and never with `--no-progress`.
    pub fn show_progress(&self, stderr_is_terminal: bool) -> bool {
        !self.no_progress && stderr_is_terminal
    }
}

pub const USAGE_HINT: &str = "\
Choose a log to look up:
  lkup -a            access log from stdin
  lkup -o            small.log
  lkup -e            error.log
  lkup FILE          any access-format log
Add -r to fetch the log from the configured server.";

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("lkup").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn nothing_selected() {
        assert_eq!(parse(&[]).selection(), None);
    }

    #[test]
    fn access_reads_stdin_locally_and_access_log_remotely() {
        let cli = parse(&["-a"]);
        let sel = cli.selection().unwrap();
        assert_eq!(sel.format, LogFormat::Access);
        assert_eq!(cli.source(&sel, "http://logs"), LogSource::Stdin);

        let cli = parse(&["-a", "-r"]);
        let sel = cli.selection().unwrap();
        assert_eq!(
            cli.source(&sel, "http://logs"),
            LogSource::Remote {
                server: "http://logs".into(),
                name: "access.log".into()
            }
        );
    }

    #[test]
    fn error_log_uses_error_format() {
        let cli = parse(&["-e"]);
        let sel = cli.selection().unwrap();
        assert_eq!(sel.name, "error.log");
        assert_eq!(sel.format, LogFormat::Error);
        assert_eq!(cli.source(&sel, ""), LogSource::File("error.log".into()));
    }

    #[test]
    fn named_file_is_access_format() {
        let cli = parse(&["/var/log/site.log", "--no-progress"]);
        let sel = cli.selection().unwrap();
        assert_eq!(sel.name, "/var/log/site.log");
        assert_eq!(sel.format, LogFormat::Access);
        assert!(cli.no_progress);
    }

    #[test]
    fn progress_needs_a_terminal_and_no_opt_out() {
        assert!(parse(&["-o"]).show_progress(true));
        assert!(!parse(&["-o"]).show_progress(false));
        assert!(!parse(&["-o", "--no-progress"]).show_progress(true));
    }

    #[test]
    fn version_is_the_package_version() {
        use clap::CommandFactory;
        assert_eq!(Cli::command().get_version(), Some("0.1.0"));
    }

    #[test]
    fn log_choices_are_exclusive() {
        let res = Cli::try_parse_from(["lkup", "-a", "-e"]);
        assert!(res.is_err());
    }
}
