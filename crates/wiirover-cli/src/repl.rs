//! REPL – drives a simulated rover from the keyboard.
//!
//! Supported slash-commands:
//!   /help             – show this list
//!   /stick RX RY      – feed a raw stick sample (0–255 per axis)
//!   /range METERS     – queue a range reading and poll the sensor
//!   /echo MICROS      – convert an echo time to meters and handle it
//!   /button NAME      – press a button (home, plus, minus, a, one, two, board)
//!   /status           – show wheel speeds, alert tier and LED mode
//!   /config           – show the active configuration
//!   /stop             – halt the wheels and darken the LED
//!   /quit | /exit     – stop the rover and exit

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use wiirover_hal::sim::SimRangeSensor;
use wiirover_hal::{LedMode, echo_to_distance_with};
use wiirover_runtime::{Rover, RoverStatus};
use wiirover_types::{AlertTier, Button, Distance, RoverError};

use crate::config::{self, Config};

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Stick { raw_x: u8, raw_y: u8 },
    Range(f64),
    Echo(Duration),
    Press(Button),
    Status,
    Config,
    Stop,
    Quit,
}

/// Parse one line of input.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Err("empty command".to_string());
    };
    let args: Vec<&str> = parts.collect();

    let expect_args = |n: usize, usage: &str| -> Result<(), String> {
        if args.len() == n {
            Ok(())
        } else {
            Err(format!("usage: {usage}"))
        }
    };

    match head {
        "/help" => Ok(Command::Help),
        "/stick" => {
            expect_args(2, "/stick RX RY")?;
            let raw_x = parse_axis(args[0], "RX")?;
            let raw_y = parse_axis(args[1], "RY")?;
            Ok(Command::Stick { raw_x, raw_y })
        }
        "/range" => {
            expect_args(1, "/range METERS")?;
            Ok(Command::Range(parse_num::<f64>(args[0], "METERS")?))
        }
        "/echo" => {
            expect_args(1, "/echo MICROS")?;
            Ok(Command::Echo(Duration::from_micros(parse_num::<u64>(
                args[0], "MICROS",
            )?)))
        }
        "/button" => {
            expect_args(1, "/button NAME")?;
            args[0]
                .parse::<Button>()
                .map(Command::Press)
                .map_err(|e| e.to_string())
        }
        "/status" => Ok(Command::Status),
        "/config" => Ok(Command::Config),
        "/stop" => Ok(Command::Stop),
        "/quit" | "/exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}'")),
    }
}

fn parse_axis(raw: &str, name: &str) -> Result<u8, String> {
    raw.parse::<u8>()
        .map_err(|_| format!("{name} must be a whole number from 0 to 255, got '{raw}'"))
}

fn parse_num<T: std::str::FromStr>(raw: &str, name: &str) -> Result<T, String> {
    raw.parse::<T>()
        .map_err(|_| format!("{name} must be a number, got '{raw}'"))
}

/// Entry point for the interactive REPL.
///
/// `shutdown` is polled each iteration; when set, the rover is stopped and
/// the REPL returns.
pub fn run(shutdown: Arc<AtomicBool>, cfg: Config) {
    let mut rover = match Rover::simulated(cfg.rover.clone()) {
        Ok(r) => r,
        Err(e) => {
            println!("{}: {}", "Invalid configuration".red(), e);
            return;
        }
    };
    let mut sensor = SimRangeSensor::new("front_ultrasound");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "wiirover>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match parse_command(line) {
            Ok(c) => c,
            Err(e) => {
                println!(
                    "{} {}. Type {} for available commands.",
                    "Error:".red(),
                    e.yellow(),
                    "/help".bold()
                );
                continue;
            }
        };

        match execute(&mut rover, &mut sensor, &cfg, command) {
            Ok(RoverStatus::Running) => {}
            Ok(RoverStatus::Stopping) => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            Err(e) => println!("{}: {}", "Rover error".red(), e),
        }
    }

    if let Err(e) = rover.stop() {
        println!("{}: {}", "Failed to stop rover".red(), e);
    }
}

/// Run one command against `rover`.
pub fn execute(
    rover: &mut Rover,
    sensor: &mut SimRangeSensor,
    cfg: &Config,
    command: Command,
) -> Result<RoverStatus, RoverError> {
    match command {
        Command::Help => cmd_help(),
        Command::Stick { raw_x, raw_y } => match rover.on_stick_sample(raw_x, raw_y)? {
            Some(cmd) => println!(
                "  wheels → left {} right {}",
                format!("{:+.1}", cmd.left).bold(),
                format!("{:+.1}", cmd.right).bold()
            ),
            None => println!("  {}", "no change (below threshold)".dimmed()),
        },
        Command::Range(meters) => {
            sensor.push(Distance::from_meters(meters));
            let tier = rover.poll_range(sensor)?;
            print_alert(rover, tier);
        }
        Command::Echo(elapsed) => {
            let distance = echo_to_distance_with(elapsed, cfg.speed_of_sound_mps);
            println!("  echo {:?} → {}", elapsed, distance.to_string().bold());
            let tier = rover.on_distance(distance)?;
            print_alert(rover, tier);
        }
        Command::Press(button) => {
            let status = rover.on_button(button)?;
            println!(
                "  {} pressed → LED {}",
                button.to_string().bold(),
                describe_led(rover.led_mode())
            );
            return Ok(status);
        }
        Command::Status => cmd_status(rover),
        Command::Config => cmd_config(cfg),
        Command::Stop => {
            rover.stop()?;
            println!("  {}", "Rover stopped.".green());
        }
        Command::Quit => {
            rover.stop()?;
            return Ok(RoverStatus::Stopping);
        }
    }
    Ok(rover.status())
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "wiirover Commands".bold().underline());
    println!("  {}   – feed a raw stick sample (0–255)", "/stick RX RY".bold().cyan());
    println!("  {} – range reading in meters", "/range METERS".bold().cyan());
    println!("  {}  – ultrasonic echo time in µs", "/echo MICROS".bold().cyan());
    println!("  {}  – press a button", "/button NAME".bold().cyan());
    println!("  {}        – wheels, alert tier, LED", "/status".bold().cyan());
    println!("  {}        – active configuration", "/config".bold().cyan());
    println!("  {}          – halt wheels, LED off", "/stop".bold().cyan());
    println!("  {}  – exit", "/quit  /exit".bold().cyan());
    println!();
}

fn cmd_status(rover: &Rover) {
    let (left, right) = rover.wheel_speeds();
    println!("{}", "Rover Status".bold().underline());
    println!("  Left wheel  : {}", format!("{left:+.1}").yellow());
    println!("  Right wheel : {}", format!("{right:+.1}").yellow());
    let tier = rover
        .last_tier()
        .map_or_else(|| "no reading yet".to_string(), |t| t.to_string());
    println!("  Alert tier  : {}", tier.yellow());
    println!("  LED         : {}", describe_led(rover.led_mode()));
}

fn cmd_config(cfg: &Config) {
    println!("{}", "Configuration".bold().underline());
    println!("  File            : {}", config::config_path().display());
    println!("  Dead zone       : {}", cfg.rover.drive.dead_zone.to_string().yellow());
    println!("  Actuation range : {}", cfg.rover.actuation_range.to_string().yellow());
    println!(
        "  Stick center    : {:?}, divisor {:?}, threshold {}",
        cfg.rover.stick.center, cfg.rover.stick.divisor, cfg.rover.stick.change_threshold
    );
    println!("  Fault policy    : {:?}", cfg.rover.fault_policy);
    println!("  Speed of sound  : {} m/s", cfg.speed_of_sound_mps);
    println!("  Alert bands:");
    for band in &cfg.rover.proximity.bands {
        println!("    < {:.2} m → {} Hz", band.below_m, band.frequency_hz);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn print_alert(rover: &Rover, tier: AlertTier) {
    println!(
        "  alert {} → LED {}",
        tier.to_string().bold(),
        describe_led(rover.led_mode())
    );
}

fn describe_led(mode: LedMode) -> String {
    match mode {
        LedMode::Steady(true) => "on".green().to_string(),
        LedMode::Steady(false) => "off".dimmed().to_string(),
        LedMode::Blinking { frequency_hz } => {
            format!("blinking at {frequency_hz} Hz").yellow().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Rover, SimRangeSensor, Config) {
        let cfg = Config::default();
        let rover = Rover::simulated(cfg.rover.clone()).unwrap();
        (rover, SimRangeSensor::new("front"), cfg)
    }

    #[test]
    fn parses_stick() {
        assert_eq!(
            parse_command("/stick 200 127"),
            Ok(Command::Stick {
                raw_x: 200,
                raw_y: 127
            })
        );
    }

    #[test]
    fn stick_axes_outside_byte_range_are_rejected() {
        let err = parse_command("/stick -2147483648 0").unwrap_err();
        assert!(err.contains("RX"));
        assert!(err.contains("0 to 255"));
        assert!(parse_command("/stick 127 256").unwrap_err().contains("RY"));
        assert!(parse_command("/stick 0 255").is_ok());
    }

    #[test]
    fn parses_range_and_echo() {
        assert_eq!(parse_command("/range 0.25"), Ok(Command::Range(0.25)));
        assert_eq!(
            parse_command("/echo 1500"),
            Ok(Command::Echo(Duration::from_micros(1500)))
        );
    }

    #[test]
    fn parses_button() {
        assert_eq!(parse_command("/button home"), Ok(Command::Press(Button::Home)));
        assert!(parse_command("/button turbo").is_err());
    }

    #[test]
    fn rejects_wrong_arity_and_garbage() {
        assert!(parse_command("/stick 1").unwrap_err().contains("usage"));
        assert!(parse_command("/range near").unwrap_err().contains("METERS"));
        assert!(parse_command("/echo -5").is_err());
        assert!(parse_command("/warp").unwrap_err().contains("unknown command"));
        assert!(parse_command("   ").is_err());
    }

    #[test]
    fn quit_aliases() {
        assert_eq!(parse_command("/quit"), Ok(Command::Quit));
        assert_eq!(parse_command("/exit"), Ok(Command::Quit));
    }

    #[test]
    fn execute_stick_moves_wheels() {
        let (mut rover, mut sensor, cfg) = setup();
        let status = execute(
            &mut rover,
            &mut sensor,
            &cfg,
            Command::Stick {
                raw_x: 127,
                raw_y: 27,
            },
        )
        .unwrap();
        assert_eq!(status, RoverStatus::Running);
        assert_eq!(rover.wheel_speeds(), (-100.0, -100.0));
    }

    #[test]
    fn execute_range_polls_sensor() {
        let (mut rover, mut sensor, cfg) = setup();
        execute(&mut rover, &mut sensor, &cfg, Command::Range(0.05)).unwrap();
        assert_eq!(rover.last_tier(), Some(AlertTier::Rate(5)));
        assert_eq!(sensor.pending(), 0);
    }

    #[test]
    fn execute_negative_range_reports_fault() {
        let (mut rover, mut sensor, cfg) = setup();
        let err = execute(&mut rover, &mut sensor, &cfg, Command::Range(-0.5)).unwrap_err();
        assert!(matches!(err, RoverError::SensorFault { .. }));
    }

    #[test]
    fn execute_echo_uses_configured_speed() {
        let (mut rover, mut sensor, cfg) = setup();
        // 1 ms round trip at 343 m/s is 17 cm: the 5 Hz band.
        execute(
            &mut rover,
            &mut sensor,
            &cfg,
            Command::Echo(Duration::from_millis(1)),
        )
        .unwrap();
        assert_eq!(rover.led_mode(), LedMode::Blinking { frequency_hz: 5.0 });
    }

    #[test]
    fn execute_home_button_stops() {
        let (mut rover, mut sensor, cfg) = setup();
        let status =
            execute(&mut rover, &mut sensor, &cfg, Command::Press(Button::Home)).unwrap();
        assert_eq!(status, RoverStatus::Stopping);
    }

    #[test]
    fn execute_quit_stops_wheels() {
        let (mut rover, mut sensor, cfg) = setup();
        rover.on_stick_sample(254, 127).unwrap();
        let status = execute(&mut rover, &mut sensor, &cfg, Command::Quit).unwrap();
        assert_eq!(status, RoverStatus::Stopping);
        assert_eq!(rover.wheel_speeds(), (0.0, 0.0));
    }
}
