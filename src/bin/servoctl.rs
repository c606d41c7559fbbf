use clap::{App, Arg, ArgMatches, SubCommand};
use colored::*;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "8090";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new("servoctl")
        .version("0.1.0")
        .author("Robotics Systems Engineering Team")
        .about("🦾 Servo bus controller client - sends joint targets over the command link")
        .arg(
            Arg::with_name("host")
                .short("h")
                .long("host")
                .value_name("HOST")
                .help("Bridge host address")
                .takes_value(true)
                .default_value(DEFAULT_HOST)
                .global(true),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .value_name("PORT")
                .help("Bridge port")
                .takes_value(true)
                .default_value(DEFAULT_PORT)
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("set")
                .about("🎯 Set one joint target, e.g. `servoctl set m1 135`")
                .arg(
                    Arg::with_name("joint")
                        .help("Joint identifier (m1..m6)")
                        .required(true),
                )
                .arg(
                    Arg::with_name("angle")
                        .help("Target angle in degrees")
                        .required(true)
                        .validator(|v| match v.parse::<u32>() {
                            Ok(_) => Ok(()),
                            Err(_) => Err("Angle must be a non-negative integer".into()),
                        }),
                ),
        )
        .subcommand(
            SubCommand::with_name("pose")
                .about("🤖 Set several joints at once, e.g. `servoctl pose m1:90 m2:45`")
                .arg(
                    Arg::with_name("targets")
                        .help("Joint targets in id:angle form")
                        .required(true)
                        .multiple(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("raw")
                .about("📨 Send a raw protocol line unchanged")
                .arg(
                    Arg::with_name("line")
                        .help("Line to send, e.g. 'm1:90;m2:45'")
                        .required(true),
                ),
        )
        .get_matches();

    let line = match matches.subcommand() {
        ("set", Some(sub)) => {
            let joint = sub.value_of("joint").unwrap_or_default();
            let angle = sub.value_of("angle").unwrap_or_default();
            format!("{joint}:{angle}")
        }
        ("pose", Some(sub)) => {
            let targets: Vec<&str> = sub
                .values_of("targets")
                .map(Iterator::collect)
                .unwrap_or_default();
            targets.join(";")
        }
        ("raw", Some(sub)) => sub.value_of("line").unwrap_or_default().to_string(),
        _ => {
            eprintln!("{}", "No command given; try `servoctl set m1 135`".red());
            std::process::exit(1);
        }
    };

    send_line(&matches, &line).await
}

async fn send_line(
    matches: &ArgMatches<'_>,
    line: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = matches.value_of("host").unwrap_or(DEFAULT_HOST);
    let port = matches.value_of("port").unwrap_or(DEFAULT_PORT);
    let addr = format!("{host}:{port}");

    let stream = TcpStream::connect(&addr).await.map_err(|e| {
        eprintln!(
            "{} {}",
            "Failed to connect to".red(),
            format!("{addr}: {e}").red()
        );
        e
    })?;

    let (reader, mut writer) = stream.into_split();

    // The bridge greets each connection; show it before sending.
    let mut greeting = String::new();
    let mut buf_reader = BufReader::new(reader);
    if buf_reader.read_line(&mut greeting).await.is_ok() && !greeting.trim().is_empty() {
        println!("{} {}", "◀".cyan(), greeting.trim().cyan());
    }

    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;

    // Fire-and-forget protocol: no acknowledgment to wait for.
    println!("{} {}", "▶".green(), line.green().bold());
    println!("{}", "Sent (no acknowledgment expected)".dimmed());

    Ok(())
}
