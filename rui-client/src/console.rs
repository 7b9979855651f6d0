//! Line-oriented console standing in for the widget toolkit.
//!
//! Runs on its own thread as the UI-event loop: every line is one tick,
//! which first applies queued server updates and then executes the
//! command.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use rui_core::{ControlPanel, FrameBufferSink, Publish, SaveOutcome};
use tracing::{error, info};

const HELP: &str = "\
commands:
  set <channel> <0..1>   move a slider (fov exposure gamma X Y lambda1 lambda2)
  rotate <radians>       turn the environment rotation dial
  device <name|index>    choose the render device
  model <name>           load a model from the menu
  save [path]            write the current HDR frame as PFM
  show                   print control values, histogram and frame status
  stop                   stop the remote renderer and exit
  quit                   exit, leaving the renderer running
";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set { channel: String, value: f32 },
    Rotate(f32),
    Device(String),
    Model(String),
    Save(Option<PathBuf>),
    Show,
    Help,
    Stop,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let number = |s: &str| {
        s.parse::<f32>()
            .map_err(|_| format!("'{s}' is not a number"))
    };

    let cmd = match (verb, rest.as_slice()) {
        ("set", [channel, value]) => Command::Set {
            channel: channel.to_string(),
            value: number(value)?,
        },
        ("rotate", [radians]) => Command::Rotate(number(radians)?),
        ("device", [name]) => Command::Device(name.to_string()),
        // Menu names may contain spaces.
        ("model", name) if !name.is_empty() => Command::Model(name.join(" ")),
        ("save", []) => Command::Save(None),
        ("save", [path]) => Command::Save(Some(PathBuf::from(path))),
        ("show", []) => Command::Show,
        ("help" | "?", []) => Command::Help,
        ("stop", []) => Command::Stop,
        ("quit" | "exit", []) => Command::Quit,
        (verb, _) => return Err(format!("bad command '{verb}'; try 'help'")),
    };
    Ok(Some(cmd))
}

/// Whether the loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Console<P: Publish> {
    panel: ControlPanel<P>,
    sink: Arc<FrameBufferSink>,
    save_path: PathBuf,
}

impl<P: Publish> Console<P> {
    pub fn new(panel: ControlPanel<P>, sink: Arc<FrameBufferSink>, save_path: PathBuf) -> Self {
        Self {
            panel,
            sink,
            save_path,
        }
    }

    /// Read commands until `stop`, `quit` or end of input, then hand the
    /// panel back so the caller controls when publishing ends.
    pub fn run(mut self, input: impl BufRead, mut out: impl Write) -> ControlPanel<P> {
        if let Err(e) = prompt(&mut out) {
            error!("writing output: {e}");
            return self.panel;
        }
        for line in input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("reading input: {e}");
                    break;
                }
            };
            match self.tick(&line, &mut out) {
                Ok(Flow::Exit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => {
                    error!("writing output: {e}");
                    break;
                }
            }
            if let Err(e) = prompt(&mut out) {
                error!("writing output: {e}");
                break;
            }
        }
        self.panel
    }

    /// One UI tick: apply server updates, then run `line`.
    pub fn tick(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        self.panel.poll_updates();
        match parse_command(line) {
            Ok(Some(cmd)) => self.execute(cmd, out),
            Ok(None) => Ok(Flow::Continue),
            Err(msg) => {
                writeln!(out, "{msg}")?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute(&mut self, cmd: Command, out: &mut impl Write) -> io::Result<Flow> {
        match cmd {
            Command::Set { channel, value } => match self.panel.set_slider(&channel, value) {
                Ok(physical) => writeln!(out, "{channel} = {physical}")?,
                Err(e) => writeln!(out, "{e}")?,
            },
            Command::Rotate(radians) => {
                let degrees = self.panel.rotate(radians);
                writeln!(out, "env_rotation = {degrees} deg")?;
            }
            Command::Device(name) => {
                let index = name
                    .parse::<usize>()
                    .ok()
                    .or_else(|| self.panel.device_index(&name));
                match index.map(|i| self.panel.select_device(i)) {
                    Some(Ok(device)) => writeln!(out, "device = {device}")?,
                    Some(Err(e)) => writeln!(out, "{e}")?,
                    None => writeln!(out, "unknown device '{name}'")?,
                }
            }
            Command::Model(name) => {
                if self.panel.models().is_empty() {
                    writeln!(out, "no model menu; pass --nif-paths to enable selection")?;
                } else {
                    match self.panel.select_model(&name) {
                        Ok(path) => writeln!(out, "loading {path}")?,
                        Err(e) => writeln!(out, "{e}")?,
                    }
                }
            }
            Command::Save(path) => {
                let path = path.unwrap_or_else(|| self.save_path.clone());
                match self.sink.save_pfm(&path) {
                    Ok(SaveOutcome::Written(h)) => {
                        writeln!(out, "saved {}x{} frame to {}", h.width, h.height, path.display())?
                    }
                    Ok(SaveOutcome::Skipped) => writeln!(out, "no frame received yet")?,
                    Err(e) => writeln!(out, "{e}")?,
                }
            }
            Command::Show => self.show(out)?,
            Command::Help => write!(out, "{HELP}")?,
            Command::Stop => {
                if let Err(e) = self.panel.stop() {
                    error!("could not send stop: {e}");
                }
                info!("stop requested");
                return Ok(Flow::Exit);
            }
            Command::Quit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    fn show(&self, out: &mut impl Write) -> io::Result<()> {
        for slider in self.panel.sliders() {
            writeln!(
                out,
                "{:<14} {:<8} ui {:.3}  sent {:.3}",
                slider.label(),
                slider.channel(),
                slider.value(),
                slider.physical()
            )?;
        }
        writeln!(
            out,
            "{:<14} {:<8} {:.3} rad",
            "Env Rotation",
            "",
            self.panel.rotation()
        )?;
        writeln!(
            out,
            "device: {} (of {})",
            self.panel.selected_device(),
            self.panel.devices().join(", ")
        )?;
        if !self.panel.models().is_empty() {
            writeln!(
                out,
                "models: {}",
                self.panel.models().names().collect::<Vec<_>>().join(", ")
            )?;
        }

        let histogram = self.panel.histogram();
        if histogram.is_empty() {
            writeln!(out, "{}: -", rui_core::histogram::CAPTION)?;
        } else {
            writeln!(
                out,
                "{} ({}): {}",
                rui_core::histogram::CAPTION,
                histogram.header,
                sparkline(&histogram.values)
            )?;
        }

        match self.sink.with_current(|h, _| *h) {
            Some(h) => writeln!(
                out,
                "frame: {}x{} ({} received)",
                h.width,
                h.height,
                self.sink.frames_completed()
            )?,
            None => writeln!(out, "frame: none yet")?,
        }
        Ok(())
    }
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

/// Render `[0, 1]` values as block characters.
fn sparkline(values: &[f32]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    values
        .iter()
        .map(|v| {
            let i = (v.clamp(0.0, 1.0) * (BARS.len() - 1) as f32).round() as usize;
            BARS[i]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rui_core::channels;
    use rui_core::value::encode;
    use rui_core::{Demuxer, HdrHeader, ModelMenu, RuiError};
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Publish for Recorder {
        fn publish(&self, channel: &str, _payload: Vec<u8>) -> Result<(), RuiError> {
            self.0.lock().unwrap().push(channel.to_string());
            Ok(())
        }
    }

    fn console() -> (Console<Recorder>, Demuxer, Recorder) {
        let rec = Recorder::default();
        let mut demux = Demuxer::new();
        let sink = FrameBufferSink::new();
        sink.subscribe(&mut demux);
        let panel = ControlPanel::new(rec.clone(), &mut demux, Vec::new(), ModelMenu::default());
        (Console::new(panel, sink, PathBuf::from("frame.pfm")), demux, rec)
    }

    fn run_line(console: &mut Console<Recorder>, line: &str) -> (Flow, String) {
        let mut out = Vec::new();
        let flow = console.tick(line, &mut out).unwrap();
        (flow, String::from_utf8(out).unwrap())
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_command("set fov 0.5").unwrap(),
            Some(Command::Set {
                channel: "fov".into(),
                value: 0.5
            })
        );
        assert_eq!(parse_command("rotate 3.14").unwrap(), Some(Command::Rotate(3.14)));
        assert_eq!(
            parse_command("model Big Garden").unwrap(),
            Some(Command::Model("Big Garden".into()))
        );
        assert_eq!(parse_command("save").unwrap(), Some(Command::Save(None)));
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(parse_command("set fov").is_err());
        assert!(parse_command("set fov wide").is_err());
        assert!(parse_command("fly").is_err());
    }

    #[test]
    fn set_reports_physical_value() {
        let (mut console, _demux, rec) = console();
        let (flow, text) = run_line(&mut console, "set fov 0.5");
        assert_eq!(flow, Flow::Continue);
        assert_eq!(text.trim(), "fov = 180");
        assert_eq!(rec.0.lock().unwrap().iter().filter(|c| *c == "fov").count(), 2);
    }

    #[test]
    fn device_by_name_or_index() {
        let (mut console, _demux, _rec) = console();
        assert_eq!(run_line(&mut console, "device ipu").1.trim(), "device = ipu");
        assert_eq!(run_line(&mut console, "device 0").1.trim(), "device = cpu");
        assert!(run_line(&mut console, "device tpu").1.contains("unknown device"));
    }

    #[test]
    fn model_without_menu_explains() {
        let (mut console, _demux, _rec) = console();
        assert!(run_line(&mut console, "model Garden").1.contains("--nif-paths"));
    }

    #[test]
    fn tick_applies_server_updates_first() {
        let (mut console, demux, _rec) = console();
        demux.dispatch(channels::TILE_HISTOGRAM, &encode(&vec![1u32, 2]));
        demux.dispatch(channels::HDR_HEADER, &encode(&HdrHeader::new(1, 1)));
        demux.dispatch(channels::HDR_PACKET, &encode(&vec![0.5f32; 3]));

        let (_, text) = run_line(&mut console, "show");
        assert!(text.contains("max tile: 2"));
        assert!(text.contains("frame: 1x1"));
    }

    #[test]
    fn save_before_frame_says_so() {
        let (mut console, _demux, _rec) = console();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.pfm");
        let (_, text) = run_line(&mut console, &format!("save {}", path.display()));
        assert_eq!(text.trim(), "no frame received yet");
        assert!(!path.exists());
    }

    #[test]
    fn stop_publishes_and_exits() {
        let (console, _demux, rec) = console();
        let input = io::Cursor::new("set gamma 0.25\nstop\nset gamma 1\n");
        let mut out = Vec::new();
        let panel = console.run(input, &mut out);

        let sent = rec.0.lock().unwrap().clone();
        assert_eq!(sent.last().map(String::as_str), Some(channels::STOP));
        assert_eq!(sent.iter().filter(|c| *c == "gamma").count(), 2);
        assert_eq!(panel.slider(channels::GAMMA).unwrap().value(), 0.25);
    }

    /// Output sink that refuses every write.
    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn closed_output_ends_loop_before_reading() {
        let (console, _demux, rec) = console();
        let before = rec.0.lock().unwrap().len();
        let panel = console.run(io::Cursor::new("set gamma 1\nstop\n"), Closed);

        assert_eq!(rec.0.lock().unwrap().len(), before);
        assert_eq!(
            panel.slider(channels::GAMMA).unwrap().value(),
            rui_core::controls::params::GAMMA.default
        );
    }

    #[test]
    fn sparkline_spans_range() {
        assert_eq!(sparkline(&[0.0, 1.0]), "▁█");
    }
}
