// `error_chain!` can recurse deeply
#![recursion_limit = "1024"]

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;

mod beep;
mod keymap;
mod looper;
mod term;
#[cfg(feature = "sdl")]
mod window;

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chip8::pacer::TICKS_PER_SECOND;
use chip8::scheduler::DEFAULT_INSTRUCTIONS_PER_TICK;
use chip8::{Audio, Display, Flow, FrameBuffer, Input, NoInput, Quirks, Scheduler, Silence, Snapshot, Vm};
use clap::{App, Arg, ArgMatches};
use env_logger::Target;
use log::LevelFilter;

use crate::looper::{BlockingLooper, Looper, Step};

error_chain! {
    foreign_links {
        Chip8(chip8::Error);
        Io(io::Error);
        ParseInt(::std::num::ParseIntError);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum DisplayKind {
    Console,
    Window,
    Headless,
}

impl FromStr for DisplayKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<DisplayKind> {
        match s {
            "console" => Ok(DisplayKind::Console),
            "window" => Ok(DisplayKind::Window),
            "headless" => Ok(DisplayKind::Headless),
            other => bail!("unknown display {:?}", other),
        }
    }
}

#[derive(Debug)]
struct CommandArgs {
    rom_file_name: PathBuf,
    cycles_per_tick: usize,
    display: DisplayKind,
    scale: u32,
    mute: bool,
    quirks: Quirks,
    load_state: Option<PathBuf>,
    save_state: Option<PathBuf>,
    max_ticks: Option<u64>,
    verbosity: u64,
    log_file: Option<PathBuf>,
}

fn app() -> App<'static, 'static> {
    App::new("chipster")
        .version(clap::crate_version!())
        .about("CHIP-8 emulator")
        .arg(Arg::with_name("ROM_FILE").help("rom file to load").required(true))
        .arg(
            Arg::with_name("cycles per tick")
                .short("c")
                .long("cycles-per-tick")
                .value_name("N")
                .help(
                    "How many instructions are executed per 60Hz frame. Values between \
                     10-1000 should be fine.",
                )
                .takes_value(true),
        )
        .arg(
            Arg::with_name("display")
                .short("d")
                .long("display")
                .value_name("BACKEND")
                .possible_values(&["console", "window", "headless"])
                .help("Where to show the screen. `window` needs the `sdl` feature.")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("scale")
                .long("scale")
                .value_name("N")
                .help("Window pixel size")
                .takes_value(true),
        )
        .arg(Arg::with_name("mute").long("mute").help("Disable sound"))
        .arg(
            Arg::with_name("preset")
                .long("preset")
                .value_name("INTERPRETER")
                .possible_values(&["cosmac", "superchip"])
                .help("Start from the quirks of a historical interpreter")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("shift legacy")
                .long("shift-legacy")
                .help("8xy6/8xyE shift Vy into Vx"),
        )
        .arg(
            Arg::with_name("load store increment")
                .long("load-store-increment")
                .help("Fx55/Fx65 advance I"),
        )
        .arg(
            Arg::with_name("wrap")
                .long("wrap")
                .help("Wrap sprites around the screen edges"),
        )
        .arg(
            Arg::with_name("jump vx")
                .long("jump-vx")
                .help("Bxnn jumps to xnn + Vx instead of nnn + V0"),
        )
        .arg(
            Arg::with_name("load state")
                .long("load-state")
                .value_name("FILE")
                .help("Resume from a snapshot")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("save state")
                .long("save-state")
                .value_name("FILE")
                .help("Write a snapshot on exit")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("max ticks")
                .long("max-ticks")
                .value_name("N")
                .help("Stop after this many frames")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("log file")
                .long("log-file")
                .value_name("FILE")
                .help("Write logs here. The console display logs nowhere without it.")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("More logging, repeat for more"),
        )
}

impl CommandArgs {
    fn parse() -> Result<CommandArgs> {
        CommandArgs::from_matches(&app().get_matches())
    }

    fn from_matches(matches: &ArgMatches) -> Result<CommandArgs> {
        let cycles_per_tick = match matches.value_of("cycles per tick") {
            Some(s) => s
                .parse::<usize>()
                .chain_err(|| format!("invalid --cycles-per-tick {:?}", s))?,
            None => DEFAULT_INSTRUCTIONS_PER_TICK,
        };

        let scale = match matches.value_of("scale") {
            Some(s) => s.parse::<u32>().chain_err(|| format!("invalid --scale {:?}", s))?,
            None => 10,
        };

        let max_ticks = match matches.value_of("max ticks") {
            Some(s) => Some(s.parse::<u64>().chain_err(|| format!("invalid --max-ticks {:?}", s))?),
            None => None,
        };

        let mut quirks = match matches.value_of("preset") {
            Some("cosmac") => Quirks::cosmac(),
            Some("superchip") => Quirks::superchip(),
            _ => Quirks::default(),
        };
        if matches.is_present("shift legacy") {
            quirks.shift_legacy = true;
        }
        if matches.is_present("load store increment") {
            quirks.load_store_increment = true;
        }
        if matches.is_present("wrap") {
            quirks.draw_wrap = true;
        }
        if matches.is_present("jump vx") {
            quirks.jump_adds_v0 = false;
        }

        Ok(CommandArgs {
            rom_file_name: matches.value_of("ROM_FILE").unwrap_or_default().into(),
            cycles_per_tick,
            display: matches.value_of("display").unwrap_or("console").parse()?,
            scale: scale.max(1),
            mute: matches.is_present("mute"),
            quirks,
            load_state: matches.value_of("load state").map(PathBuf::from),
            save_state: matches.value_of("save state").map(PathBuf::from),
            max_ticks,
            verbosity: matches.occurrences_of("verbose"),
            log_file: matches.value_of("log file").map(PathBuf::from),
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LogSink {
    Stderr,
    File(PathBuf),
    Off,
}

impl LogSink {
    /// The console display owns the terminal, stderr included.
    fn for_args(args: &CommandArgs) -> LogSink {
        match (&args.log_file, args.display) {
            (Some(path), _) => LogSink::File(path.clone()),
            (None, DisplayKind::Console) => LogSink::Off,
            (None, _) => LogSink::Stderr,
        }
    }
}

fn init_logging(verbosity: u64, sink: LogSink) -> Result<()> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_env("RUST_LOG");
    match sink {
        LogSink::Off => return Ok(()),
        LogSink::Stderr => {}
        LogSink::File(path) => {
            let file = File::create(&path).chain_err(|| format!("can't create log file {}", path.display()))?;
            builder.target(Target::Pipe(Box::new(file)));
        }
    }
    builder.init();
    Ok(())
}

fn read_rom<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).chain_err(|| format!("can't read rom {}", path.display()))
}

fn main() {
    use std::process::exit;

    let args = match CommandArgs::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };
    if let Err(e) = init_logging(args.verbosity, LogSink::for_args(&args)) {
        eprintln!("Error: {}", e);
        exit(1);
    }

    match do_run(&args) {
        Ok(_) => exit(0),
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.iter().skip(1) {
                eprintln!("  caused by: {}", cause);
            }
            exit(1);
        }
    }
}

struct Backends {
    display: Box<dyn Display>,
    input: Box<dyn Input>,
    audio: Box<dyn Audio>,
}

impl Backends {
    fn headless() -> Backends {
        Backends {
            display: Box::new(FrameBuffer::new()),
            input: Box::new(NoInput),
            audio: Box::new(Silence),
        }
    }

    fn console(mute: bool) -> Result<Backends> {
        let session = term::Session::start()?;
        let display = term::TermDisplay::new(session.clone())?;
        let input = term::TermInput::new(session);
        let audio: Box<dyn Audio> = if mute { Box::new(Silence) } else { Box::new(beep::Bell) };
        Ok(Backends {
            display: Box::new(display),
            input: Box::new(input),
            audio,
        })
    }

    #[cfg(feature = "sdl")]
    fn window(scale: u32, mute: bool) -> Result<Backends> {
        let (display, input, audio) = window::open(scale, mute)?;
        let audio: Box<dyn Audio> = match audio {
            Some(audio) => audio,
            None if mute => Box::new(Silence),
            None => Box::new(beep::Bell),
        };
        Ok(Backends {
            display: Box::new(display),
            input: Box::new(input),
            audio,
        })
    }

    #[cfg(not(feature = "sdl"))]
    fn window(_scale: u32, _mute: bool) -> Result<Backends> {
        bail!("built without the `sdl` feature")
    }

    /// Opens the requested backends. Falls back to headless, and reports
    /// what was actually opened.
    fn select(args: &CommandArgs) -> (Backends, DisplayKind) {
        let backends = match args.display {
            DisplayKind::Console => Backends::console(args.mute),
            DisplayKind::Window => Backends::window(args.scale, args.mute),
            DisplayKind::Headless => Ok(Backends::headless()),
        };

        match backends {
            Ok(backends) => {
                info!("using {:?} display", args.display);
                (backends, args.display)
            }
            Err(e) => {
                warn!("can't open {:?} display, running headless: {}", args.display, e);
                (Backends::headless(), DisplayKind::Headless)
            }
        }
    }
}

fn load_snapshot(vm: &mut Vm, path: &Path) -> Result<()> {
    let file = File::open(path).chain_err(|| format!("can't open snapshot {}", path.display()))?;
    let snapshot = Snapshot::read_from(BufReader::new(file))?;
    vm.restore(&snapshot)?;
    info!("loaded snapshot from {}", path.display());
    Ok(())
}

fn save_snapshot(vm: &Vm, path: &Path) -> Result<()> {
    let file = File::create(path).chain_err(|| format!("can't create snapshot {}", path.display()))?;
    vm.snapshot().write_to(BufWriter::new(file))?;
    info!("saved snapshot to {}", path.display());
    Ok(())
}

/// Ticks until the user quits, `--max-ticks` runs out, or the host fails.
///
/// A fault leaves the engine halted. With a screen the loop keeps going so the
/// last frame stays up until the user quits; headless runs stop on it.
fn run(scheduler: &mut Scheduler, args: &CommandArgs, headless: bool) -> Result<()> {
    let mut ticks: u64 = 0;

    BlockingLooper::new(TICKS_PER_SECOND).start_loop(|| {
        if let Some(max_ticks) = args.max_ticks {
            if ticks >= max_ticks {
                info!("stopping after {} ticks", ticks);
                return Ok(Step::Done);
            }
        }
        ticks += 1;

        match scheduler.tick() {
            Ok(Flow::Continue) => Ok(Step::Cont),
            Ok(Flow::Quit) => Ok(Step::Done),
            Err(ref e) if e.is_fault() && !headless => Ok(Step::Cont),
            Err(e) => Err(e.into()),
        }
    })
}

fn do_run(args: &CommandArgs) -> Result<()> {
    let rom = read_rom(&args.rom_file_name)?;
    let mut vm = Vm::with_rom(args.quirks, &rom)?;
    info!("{} with {:?}", args.rom_file_name.display(), args.quirks);

    if let Some(ref path) = args.load_state {
        load_snapshot(&mut vm, path)?;
    }

    let (backends, opened) = Backends::select(args);
    let mut scheduler = Scheduler::new(vm, backends.display, backends.input, backends.audio)
        .with_instructions_per_tick(args.cycles_per_tick);

    let result = run(&mut scheduler, args, opened == DisplayKind::Headless);
    scheduler.shutdown();

    // Dropping the backends gives the terminal back before anything is printed.
    let vm = scheduler.into_vm();

    if let Some(ref path) = args.save_state {
        save_snapshot(&vm, path)?;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<CommandArgs> {
        let mut full = vec!["chipster"];
        full.extend_from_slice(argv);
        CommandArgs::from_matches(&app().get_matches_from(full))
    }

    #[test]
    fn defaults() {
        let args = parse(&["game.ch8"]).unwrap();
        assert_eq!(args.rom_file_name, PathBuf::from("game.ch8"));
        assert_eq!(args.cycles_per_tick, 700);
        assert_eq!(args.display, DisplayKind::Console);
        assert_eq!(args.scale, 10);
        assert_eq!(args.quirks, Quirks::default());
        assert_eq!(args.max_ticks, None);
        assert_eq!(args.verbosity, 0);
        assert!(!args.mute);
    }

    #[test]
    fn switches_apply_on_top_of_preset() {
        let args = parse(&["--preset", "superchip", "--wrap", "--shift-legacy", "game.ch8"]).unwrap();
        assert_eq!(
            args.quirks,
            Quirks {
                shift_legacy: true,
                load_store_increment: false,
                draw_wrap: true,
                jump_adds_v0: false,
            }
        );

        let args = parse(&["--jump-vx", "--load-store-increment", "game.ch8"]).unwrap();
        assert!(!args.quirks.jump_adds_v0);
        assert!(args.quirks.load_store_increment);
    }

    #[test]
    fn numbers_and_paths() {
        let args = parse(&[
            "-c", "15", "-d", "headless", "--max-ticks", "120", "--save-state", "out.bin", "-vv", "game.ch8",
        ])
        .unwrap();
        assert_eq!(args.cycles_per_tick, 15);
        assert_eq!(args.display, DisplayKind::Headless);
        assert_eq!(args.max_ticks, Some(120));
        assert_eq!(args.save_state, Some(PathBuf::from("out.bin")));
        assert_eq!(args.verbosity, 2);
    }

    #[test]
    fn bad_number_is_an_error() {
        assert!(parse(&["-c", "fast", "game.ch8"]).is_err());
    }

    #[test]
    fn console_keeps_logs_off_the_terminal() {
        let args = parse(&["-vvv", "game.ch8"]).unwrap();
        assert_eq!(LogSink::for_args(&args), LogSink::Off);

        let args = parse(&["--log-file", "run.log", "game.ch8"]).unwrap();
        assert_eq!(args.log_file, Some(PathBuf::from("run.log")));
        assert_eq!(LogSink::for_args(&args), LogSink::File(PathBuf::from("run.log")));

        let args = parse(&["-d", "headless", "game.ch8"]).unwrap();
        assert_eq!(LogSink::for_args(&args), LogSink::Stderr);
    }

    #[test]
    fn display_names() {
        assert_eq!("window".parse::<DisplayKind>().unwrap(), DisplayKind::Window);
        assert!("teletype".parse::<DisplayKind>().is_err());
    }
}
