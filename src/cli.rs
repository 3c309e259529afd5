//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Live meeting transcription with speaker-attributed segments.
#[derive(Parser, Debug)]
#[command(name = "meetscribe", version, about)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Suppress status messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Audio input device (record mode)
    #[arg(long)]
    pub device: Option<String>,

    /// Recognition language code, e.g. en-US
    #[arg(long)]
    pub language: Option<String>,

    /// Rollover interval, e.g. "30m" or "90s"
    #[arg(long, value_parser = humantime::parse_duration)]
    pub rollover: Option<Duration>,

    /// Fragments per chunk before sealing
    #[arg(long)]
    pub chunk_fragments: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe a WAV file instead of the microphone
    Transcribe {
        /// Path to the WAV file
        file: PathBuf,
    },
    /// List available audio input devices
    Devices,
    /// Run the daemon hosting the pipeline behind a Unix socket
    Daemon {
        /// Socket path (defaults to $XDG_RUNTIME_DIR/meetscribe.sock)
        #[arg(long)]
        socket: Option<PathBuf>,
    },
    /// Tell the daemon to start a session
    Start {
        #[arg(long)]
        socket: Option<PathBuf>,
    },
    /// Tell the daemon to stop the session
    Stop {
        #[arg(long)]
        socket: Option<PathBuf>,
    },
    /// Show daemon status
    Status {
        #[arg(long)]
        socket: Option<PathBuf>,
    },
    /// Print the running session's transcript
    Snapshot {
        #[arg(long)]
        socket: Option<PathBuf>,
    },
    /// Shut the daemon down
    Shutdown {
        #[arg(long)]
        socket: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_bare_invocation() {
        let cli = Cli::try_parse_from(["meetscribe"]).expect("should parse");
        assert!(cli.command.is_none());
        assert!(!cli.quiet);
    }

    #[test]
    fn test_cli_parses_record_flags() {
        let cli = Cli::try_parse_from([
            "meetscribe",
            "--device",
            "pipewire",
            "--language",
            "de-DE",
            "--rollover",
            "10m",
            "--chunk-fragments",
            "8",
        ])
        .expect("should parse");

        assert_eq!(cli.device, Some("pipewire".to_string()));
        assert_eq!(cli.language, Some("de-DE".to_string()));
        assert_eq!(cli.rollover, Some(Duration::from_secs(600)));
        assert_eq!(cli.chunk_fragments, Some(8));
    }

    #[test]
    fn test_cli_parses_transcribe_subcommand() {
        let cli =
            Cli::try_parse_from(["meetscribe", "transcribe", "meeting.wav"]).expect("should parse");
        match cli.command {
            Some(Commands::Transcribe { file }) => {
                assert_eq!(file, PathBuf::from("meeting.wav"));
            }
            other => panic!("Expected Transcribe, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_daemon_with_socket() {
        let cli = Cli::try_parse_from(["meetscribe", "daemon", "--socket", "/tmp/m.sock"])
            .expect("should parse");
        match cli.command {
            Some(Commands::Daemon { socket }) => {
                assert_eq!(socket, Some(PathBuf::from("/tmp/m.sock")));
            }
            other => panic!("Expected Daemon, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_bad_rollover() {
        assert!(Cli::try_parse_from(["meetscribe", "--rollover", "soon"]).is_err());
    }
}
