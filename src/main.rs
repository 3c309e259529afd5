use anyhow::Result;
use clap::{CommandFactory, Parser};
use meetscribe::app::{RecordOptions, run_record, run_transcribe};
use meetscribe::capture::microphone::list_devices;
use meetscribe::cli::{Cli, Commands};
use meetscribe::config::Config;
use meetscribe::daemon::run_daemon;
use meetscribe::ipc::client::send_command;
use meetscribe::ipc::protocol::{Command, Response};
use meetscribe::ipc::server::IpcServer;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let record_options = RecordOptions {
        device: cli.device.clone(),
        language: cli.language.clone(),
        rollover: cli.rollover,
        chunk_fragments: cli.chunk_fragments,
        quiet: cli.quiet,
    };

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            run_record(config, record_options).await?;
        }
        Some(Commands::Transcribe { file }) => {
            let config = load_config(cli.config.as_deref())?;
            run_transcribe(config, &file, record_options).await?;
        }
        Some(Commands::Devices) => {
            for device in list_devices()? {
                println!("{}", device);
            }
        }
        Some(Commands::Daemon { socket }) => {
            let config = load_config(cli.config.as_deref())?;
            run_daemon(config, socket, cli.quiet).await?;
        }
        Some(Commands::Start { socket }) => {
            handle_ipc_command(socket, Command::Start).await?;
        }
        Some(Commands::Stop { socket }) => {
            handle_ipc_command(socket, Command::Stop).await?;
        }
        Some(Commands::Status { socket }) => {
            handle_ipc_command(socket, Command::Status).await?;
        }
        Some(Commands::Snapshot { socket }) => {
            handle_ipc_command(socket, Command::Snapshot).await?;
        }
        Some(Commands::Shutdown { socket }) => {
            handle_ipc_command(socket, Command::Shutdown).await?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "meetscribe",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);
    Ok(Config::load_or_default(&path)?.with_env_overrides())
}

async fn handle_ipc_command(socket: Option<PathBuf>, command: Command) -> Result<()> {
    let socket = socket.unwrap_or_else(IpcServer::default_socket_path);
    let response = send_command(&socket, command).await?;
    print_response(response);
    Ok(())
}

fn print_response(response: Response) {
    match response {
        Response::Ok => println!("{}", "ok".green()),
        Response::Started { session_id } => {
            println!("{} session {}", "recording".green().bold(), session_id);
        }
        Response::Stopped { summary } => {
            let minutes = (summary.duration_secs / 60.0).floor() as u64;
            let seconds = (summary.duration_secs % 60.0).floor() as u64;
            println!(
                "{} {} — {:02}:{:02} captured, {} chunk(s), {} segment(s)",
                "stopped".green(),
                summary.session_id,
                minutes,
                seconds,
                summary.chunks,
                summary.segments
            );
        }
        Response::Status {
            state,
            session_id,
            segments,
        } => match session_id {
            Some(id) => println!("{} (session {}, {} segment(s))", state.bold(), id, segments),
            None => println!("{}", state.bold()),
        },
        Response::Snapshot { segments } => {
            for segment in segments {
                println!(
                    "[{}] {}: {}",
                    segment.timestamp.dimmed(),
                    segment.speaker.cyan().bold(),
                    segment.text
                );
            }
        }
        Response::Error { message } => eprintln!("{} {}", "error:".red().bold(), message),
    }
}
