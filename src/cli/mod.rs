use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::{AppError, SessionController, SessionReply};
use crate::domain::{Hotel, Ledger, ReservationRequest, RoomType};

/// Cajero - Interactive Teller Simulator
#[derive(Parser)]
#[command(name = "cajero")]
#[command(about = "An interactive teller session simulator backed by an in-memory account ledger")]
#[command(version)]
pub struct Cli {
    /// Ledger seed file in JSON (defaults to the built-in demo clients)
    #[arg(short, long, global = true)]
    pub seed: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one interactive teller session on stdin/stdout
    Run,

    /// Replay a teller session from a file of newline-separated inputs
    Script {
        /// Input file, one response per line (power-on answer first)
        input: PathBuf,
    },

    /// Hotel reservation tracker commands
    #[command(subcommand)]
    Hotel(HotelCommands),
}

#[derive(Subcommand)]
pub enum HotelCommands {
    /// Book the sample reservations and print the statistics as JSON
    Demo,

    /// Book a single reservation against a fresh inventory
    Reserve {
        /// Room type: single, double, family
        #[arg(short = 't', long = "type")]
        room_type: String,

        /// Guest name
        #[arg(short, long)]
        guest: String,

        /// Guest country
        #[arg(short, long)]
        country: String,

        /// Number of guests in the party
        #[arg(short, long)]
        party_size: u32,

        /// Stay period, e.g. "2024-05-20 to 2024-05-25"
        #[arg(long)]
        period: String,

        /// Request a smoking room
        #[arg(long)]
        smoking: bool,

        /// The party brings a pet
        #[arg(long)]
        pet: bool,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Run => {
                let mut ledger = load_ledger(self.seed.as_deref())?;
                run_interactive(&mut ledger)
            }
            Commands::Script { input } => {
                let mut ledger = load_ledger(self.seed.as_deref())?;
                run_script(&mut ledger, &input)
            }
            Commands::Hotel(HotelCommands::Demo) => run_hotel_demo(),
            Commands::Hotel(HotelCommands::Reserve {
                room_type,
                guest,
                country,
                party_size,
                period,
                smoking,
                pet,
            }) => run_hotel_reserve(room_type, guest, country, party_size, period, smoking, pet),
        }
    }
}

fn load_ledger(seed: Option<&Path>) -> Result<Ledger> {
    match seed {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Cannot read seed file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid ledger seed in {}", path.display()))
        }
        None => Ok(Ledger::seed()),
    }
}

fn print_reply(reply: &SessionReply) -> Result<()> {
    for message in &reply.messages {
        println!("{}", message);
    }
    if let Some(prompt) = reply.prompt {
        println!("{}", prompt);
        io::stdout().flush()?;
    }
    Ok(())
}

fn run_interactive(ledger: &mut Ledger) -> Result<()> {
    let mut session = SessionController::new(ledger);
    let reply = session.start();
    print_reply(&reply)?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read input")?;
        let reply = session.submit(&line);
        print_reply(&reply)?;
        if reply.is_final() {
            break;
        }
    }
    Ok(())
}

fn run_script(ledger: &mut Ledger, input: &Path) -> Result<()> {
    let script = fs::read_to_string(input)
        .with_context(|| format!("Cannot read script file {}", input.display()))?;

    let mut session = SessionController::new(ledger);
    let reply = session.start();
    print_reply(&reply)?;

    for line in script.lines() {
        println!("> {}", line);
        let reply = session.submit(line);
        print_reply(&reply)?;
        if reply.is_final() {
            break;
        }
    }
    Ok(())
}

fn run_hotel_demo() -> Result<()> {
    let mut hotel = Hotel::new();
    let sample_bookings = [
        ReservationRequest {
            room_type: RoomType::Single,
            smoking: false,
            guest_name: "Juan Pérez".into(),
            country: "México".into(),
            party_size: 1,
            period: "2024-05-20 to 2024-05-25".into(),
            has_pet: false,
        },
        ReservationRequest {
            room_type: RoomType::Double,
            smoking: true,
            guest_name: "Ana García".into(),
            country: "España".into(),
            party_size: 4,
            period: "2024-06-01 to 2024-06-10".into(),
            has_pet: false,
        },
        ReservationRequest {
            room_type: RoomType::Family,
            smoking: false,
            guest_name: "Carlos López".into(),
            country: "Argentina".into(),
            party_size: 5,
            period: "2024-07-15 to 2024-07-20".into(),
            has_pet: true,
        },
        ReservationRequest {
            room_type: RoomType::Family,
            smoking: false,
            guest_name: "Lucía Fernández".into(),
            country: "Chile".into(),
            party_size: 6,
            period: "2024-08-05 to 2024-08-15".into(),
            has_pet: false,
        },
    ];

    for request in sample_bookings {
        let guest = request.guest_name.clone();
        match hotel.reserve(request) {
            Ok(reservation) => {
                println!("Reservation confirmed for {} ({})", guest, reservation.id)
            }
            Err(err) => println!("Reservation refused for {}: {}", guest, err),
        }
    }

    let stats = hotel.statistics();
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn run_hotel_reserve(
    room_type: String,
    guest: String,
    country: String,
    party_size: u32,
    period: String,
    smoking: bool,
    pet: bool,
) -> Result<()> {
    let room_type =
        RoomType::parse(&room_type).ok_or(AppError::InvalidRoomType(room_type))?;

    let mut hotel = Hotel::new();
    let reservation = hotel
        .reserve(ReservationRequest {
            room_type,
            smoking,
            guest_name: guest,
            country,
            party_size,
            period,
            has_pet: pet,
        })
        .map_err(AppError::from)?;

    println!(
        "Reservation confirmed for {} ({} room, {} guest(s)): {}",
        reservation.guest_name, reservation.room_type, reservation.party_size, reservation.id
    );
    Ok(())
}
