// sensor-dash
//
// Publishes emulated temperature/humidity readings over MQTT and shows sent
// and received messages side by side, with the state of the last on/off
// command in the header.
//
// Build: cargo run --release --bin sensor-dash -- [options]
// Quit:  q / Esc / Ctrl-C

use clap::Parser;
use crossbeam::channel;
use crossterm::style::{Attribute, SetAttribute};
use crossterm::{cursor, event, style, terminal, ExecutableCommand, QueueableCommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sensordash::emulator::SensorEmulator;
use sensordash::relay::{self, Event};
use sensordash::transport::MqttTransport;
use sensordash::view::{self, Canvas, Control, Dashboard, Highlight};
use sensordash::CancelToken;
use sensordash_tools::{init_logging, DashOpts};
use std::io::{self, Write};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "sensor-dash",
    version,
    about = "Emulated sensor publisher with a sent/received MQTT dashboard"
)]
struct Cli {
    #[command(flatten)]
    opts: DashOpts,
}

struct Tui {
    stdout: io::Stdout,
}

impl Tui {
    fn setup() -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        stdout.execute(terminal::EnterAlternateScreen)?;
        stdout.execute(cursor::Hide)?;
        Ok(Self { stdout })
    }

    fn teardown(&mut self) {
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

impl Canvas for Tui {
    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn clear(&mut self) -> io::Result<()> {
        self.stdout.queue(terminal::Clear(terminal::ClearType::All))?;
        Ok(())
    }

    fn put(&mut self, row: u16, col: u16, text: &str, highlight: Highlight) -> io::Result<()> {
        self.stdout.queue(cursor::MoveTo(col, row))?;
        if highlight == Highlight::Reverse {
            self.stdout.queue(SetAttribute(Attribute::Reverse))?;
        }
        self.stdout.queue(style::Print(text))?;
        if highlight == Highlight::Reverse {
            self.stdout.queue(SetAttribute(Attribute::Reset))?;
        }
        Ok(())
    }

    fn present(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

fn spawn_input(control: channel::Sender<Control>) -> io::Result<()> {
    std::thread::Builder::new()
        .name("keys".to_string())
        .spawn(move || loop {
            let msg = match event::read() {
                Ok(event::Event::Key(k)) => {
                    use event::{KeyCode, KeyEventKind, KeyModifiers};
                    if k.kind != KeyEventKind::Press {
                        continue;
                    }
                    let quit = k.code == KeyCode::Char('q')
                        || k.code == KeyCode::Esc
                        || (k.code == KeyCode::Char('c') && k.modifiers == KeyModifiers::CONTROL);
                    if !quit {
                        continue;
                    }
                    Control::Quit
                }
                Ok(event::Event::Resize(cols, rows)) => Control::Resize(cols, rows),
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!(error = %e, "terminal input failed");
                    return;
                }
            };
            if control.send(msg).is_err() {
                return;
            }
        })?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfg = match cli.opts.resolve() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(&cfg.log_file) {
        eprintln!("ERROR: cannot open log file {}: {}", cfg.log_file.display(), e);
        return ExitCode::FAILURE;
    }

    let topics = cfg.topics();
    let (outbound_tx, outbound_rx) = relay::channel(cfg.relay_capacity());
    let (inbound_tx, inbound_rx) = relay::channel(cfg.relay_capacity());

    // Connect before touching the terminal so failures print normally.
    let transport = match MqttTransport::connect(
        &cfg.broker,
        vec![topics.light().to_string()],
        move |topic, payload| {
            if inbound_tx.send(Event::new(topic, payload)).is_err() {
                tracing::debug!("inbound relay closed");
            }
        },
    ) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "broker connection failed");
            eprintln!("ERROR: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancelToken::new();
    let mut emulator = SensorEmulator::new(
        transport.publisher(),
        topics,
        outbound_tx,
        cfg.schedule(),
        cfg.on_publish_error,
        StdRng::from_os_rng(),
    );
    let emu_cancel = cancel.clone();
    let emulator = std::thread::Builder::new()
        .name("emulator".to_string())
        .spawn(move || {
            if let Err(e) = emulator.run(&emu_cancel) {
                tracing::error!(error = %e, "emulator stopped, dashboard data is frozen");
            }
        });
    let emulator = match emulator {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("ERROR: cannot start emulator: {}", e);
            transport.disconnect();
            return ExitCode::FAILURE;
        }
    };

    let mut tui = match Tui::setup() {
        Ok(tui) => tui,
        Err(e) => {
            eprintln!("ERROR: terminal setup failed: {}", e);
            cancel.cancel();
            transport.disconnect();
            return ExitCode::FAILURE;
        }
    };
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let mut t = Tui {
            stdout: io::stdout(),
        };
        t.teardown();
        original_hook(panic_info);
    }));

    let (control_tx, control_rx) = channel::unbounded();
    let mut result = spawn_input(control_tx);

    if result.is_ok() {
        result = tui.size().and_then(|(cols, rows)| {
            let mut dashboard = Dashboard::new(outbound_rx, inbound_rx, cols, rows);
            view::run(&mut dashboard, &mut tui, &cancel, &control_rx, cfg.tick())
        });
    }

    cancel.cancel();
    tui.teardown();
    // Disconnecting first unblocks a publish stuck on a full request queue.
    transport.disconnect();
    let _ = emulator.join();
    tracing::info!("bye");

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}
