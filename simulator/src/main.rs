use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use pl0vm::{parse_instruction_stream, TraceEntry, VirtualMachine};

fn main() -> ExitCode {
    simple_logger::SimpleLogger::new()
        .env()
        .init()
        .expect("logger already initialized");

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: pl0vm <code-file> [--tui]");
        return ExitCode::FAILURE;
    }

    let code_path = &args[1];
    let tui = args.iter().any(|a| a == "--tui");

    let stream = match fs::read_to_string(code_path) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("failed to read {code_path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let code = match parse_instruction_stream(&stream) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("malformed instruction stream: {err}");
            return ExitCode::FAILURE;
        }
    };

    if tui {
        match tui::run(VirtualMachine::new(code)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("tui error: {err}");
                ExitCode::FAILURE
            }
        }
    } else {
        run_batch(VirtualMachine::new(code))
    }
}

/// Batch mode: execute to completion against stdin/stdout, printing the
/// fixed-width trace (§6 "Trace output format") to stderr.
fn run_batch(mut vm: VirtualMachine) -> ExitCode {
    let mut stdin_numbers = read_stdin_numbers();
    eprintln!("# OP R L M PC BP SP STK");
    match vm.run(&mut stdin_numbers) {
        Ok(outcome) => {
            for entry in &outcome.trace {
                eprintln!("{}", render_trace_line(entry));
            }
            eprintln!("HLT");
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let rendered = outcome
                .output
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(handle, "{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("abnormal halt: {err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn read_stdin_numbers() -> std::vec::IntoIter<i64> {
    let mut buf = String::new();
    let _ = io::stdin().read_to_string(&mut buf);
    buf.split_whitespace()
        .filter_map(|tok| tok.parse().ok())
        .collect::<Vec<i64>>()
        .into_iter()
}

fn render_stack(dump: &[Vec<i64>]) -> String {
    dump.iter()
        .map(|frame| {
            frame
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("|")
}

fn render_trace_line(entry: &TraceEntry) -> String {
    format!(
        "{} {} {} {} {} {} {} {} {}",
        entry.ir,
        entry.op.mnemonic(),
        entry.r,
        entry.l,
        entry.m,
        entry.pc,
        entry.bp,
        entry.sp,
        render_stack(&entry.stack_dump)
    )
}

mod tui {
    use std::io;
    use std::time::Duration;

    use crossterm::event::{self, Event, KeyCode};
    use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
    use crossterm::ExecutableCommand;
    use ratatui::backend::CrosstermBackend;
    use ratatui::layout::{Constraint, Direction, Layout};
    use ratatui::style::{Color, Style};
    use ratatui::text::Line;
    use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
    use ratatui::Terminal;

    use crate::render_stack;
    use pl0vm::VirtualMachine;

    /// Single-step debugger: register file, call-stack dump, next
    /// instruction. `s`/`Enter` steps one instruction, `q`/`Esc` quits.
    pub fn run(mut vm: VirtualMachine) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let mut stdin_numbers = super::read_stdin_numbers();
        let mut last_entry: Option<super::TraceEntry> = None;
        let mut halted = false;
        let mut status = String::from("ready");

        let result = loop {
            let next_instr = vm.code().get(vm.pc() as usize).copied();

            if let Err(err) = terminal.draw(|frame| {
                draw(frame, &vm, next_instr, last_entry.as_ref(), &status, halted)
            }) {
                break Err(err);
            }

            if !event::poll(Duration::from_millis(200)).unwrap_or(false) {
                continue;
            }
            let event = match event::read() {
                Ok(event) => event,
                Err(err) => break Err(err),
            };
            if let Event::Key(key) = event {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break Ok(()),
                    KeyCode::Char('s') | KeyCode::Enter if !halted => {
                        match vm.step(&mut stdin_numbers) {
                            Ok(step) => {
                                halted = step.halted;
                                status = if halted {
                                    "halted".to_string()
                                } else {
                                    format!("stepped ir={}", step.entry.ir)
                                };
                                last_entry = Some(step.entry);
                            }
                            Err(err) => {
                                halted = true;
                                status = format!("error: {err}");
                            }
                        }
                    }
                    _ => {}
                }
            }
        };

        disable_raw_mode()?;
        io::stdout().execute(LeaveAlternateScreen)?;
        let _ = terminal;
        result
    }

    fn draw(
        frame: &mut ratatui::Frame<'_>,
        vm: &VirtualMachine,
        next_instr: Option<pl0c::translator::instruction::Instruction>,
        last_entry: Option<&super::TraceEntry>,
        status: &str,
        halted: bool,
    ) {
        let area = frame.area();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(area);

        let registers = vm
            .registers()
            .iter()
            .enumerate()
            .map(|(i, v)| format!("r{i}={v}"))
            .collect::<Vec<_>>()
            .join("  ");
        frame.render_widget(
            Paragraph::new(Line::from(format!(
                "pc={} bp={} sp={}  {registers}",
                vm.pc(),
                vm.bp(),
                vm.sp()
            )))
            .block(Block::default().borders(Borders::ALL).title("machine state")),
            rows[0],
        );

        let stack_text = last_entry
            .map(|entry| render_stack(&entry.stack_dump))
            .unwrap_or_default();
        let next = next_instr
            .map(|i| format!("{} r={} l={} m={}", i.op.mnemonic(), i.r, i.l, i.m))
            .unwrap_or_else(|| "<none>".to_string());
        let items = vec![
            ListItem::new(format!("next: {next}")),
            ListItem::new(format!("call stack: {stack_text}")),
        ];
        frame.render_widget(
            List::new(items).block(Block::default().borders(Borders::ALL).title("call stack")),
            rows[1],
        );

        let footer = if halted {
            "halted — q to quit".to_string()
        } else {
            format!("{status} — s/Enter to step, q to quit")
        };
        frame.render_widget(
            Paragraph::new(footer).style(Style::default().fg(Color::DarkGray)),
            rows[2],
        );
    }
}
