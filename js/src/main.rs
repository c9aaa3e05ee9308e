use protojs::*;

#[derive(clap::Parser)]
#[command(name = "js", version, about = "Prototype-based JavaScript subset interpreter")]
struct Cli {
    /// Execute script
    #[arg(short, long)]
    eval: Option<String>,

    /// Maximum nesting of function calls before a RangeError
    #[arg(long, default_value_t = EngineConfig::default().max_call_depth)]
    max_call_depth: usize,

    /// JavaScript file to execute
    file: Option<std::path::PathBuf>,
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

fn main() -> Result<(), BoxError> {
    // Initialize logger (controlled by RUST_LOG)
    env_logger::init();

    // Deeply nested calls recurse on the native stack; give the interpreter room.
    let builder = std::thread::Builder::new().name("js-main".into()).stack_size(256 * 1024 * 1024);
    let handler = builder.spawn(run_main)?;
    handler.join().map_err(|_| "interpreter thread panicked")?
}

fn run_main() -> Result<(), BoxError> {
    let cli = <Cli as clap::Parser>::parse();
    let config = EngineConfig {
        max_call_depth: cli.max_call_depth,
    };

    let echo_result = cli.eval.is_some();
    let script_content = if let Some(script) = cli.eval {
        script
    } else if let Some(ref file) = cli.file {
        match read_script_file(file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file {}: {}", file.display(), e.user_message());
                std::process::exit(1);
            }
        }
    } else {
        // No script argument -> start the interactive, persistent REPL
        run_persistent_repl(config)?;
        return Ok(());
    };

    let mut engine = Engine::with_config(config)?;
    match engine.eval(script_content, &mut StdoutSink) {
        Ok(result) if echo_result => println!("{result}"),
        Ok(result) => log::debug!("completion value: {result}"),
        Err(err) => {
            eprintln!("{}", err.user_message());
            if let Some(file_path) = cli.file.as_ref() {
                if let Some((line, col)) = err.js_position() {
                    eprintln!("  in file: {}:{}:{}", file_path.display(), line, col);
                } else {
                    eprintln!("  in file: {}", file_path.display());
                }
            }
            std::process::exit(1);
        }
    }
    Ok(())
}

// Persistent rustyline-powered REPL loop extracted into a helper to keep `main()` small.
fn run_persistent_repl(config: EngineConfig) -> Result<(), BoxError> {
    use rustyline::Editor;
    use rustyline::error::ReadlineError;
    use std::path::PathBuf;

    let ver = clap::crate_version!();
    println!("protojs REPL (persistent environment) v{ver}. Type 'exit' or Ctrl-D to quit.");

    let mut rl = match Editor::<(), rustyline::history::FileHistory>::new() {
        Ok(e) => e,
        Err(err) => {
            eprintln!("Failed to initialize line editor: {err}");
            std::process::exit(1);
        }
    };

    // Simple history file in the user's home directory
    let history_path: Option<PathBuf> = std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".protojs_history"));
    if let Some(ref p) = history_path
        && let Err(err) = rl.load_history(p)
    {
        log::debug!("no REPL history loaded from {}: {err}", p.display());
    }

    let mut repl = Repl::with_config(config)?;

    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { "js> " } else { ".... " };

        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if buffer.is_empty() && (trimmed == "exit" || trimmed == ".exit") {
                    break;
                }

                if buffer.is_empty() {
                    buffer = line;
                } else {
                    buffer.push('\n');
                    buffer.push_str(&line);
                }

                // unclosed brackets, strings or comments: keep reading
                if !Repl::is_complete_input(&buffer) {
                    continue;
                }

                if buffer.trim().is_empty() {
                    buffer.clear();
                    continue;
                }

                rl.add_history_entry(buffer.clone())?;

                match repl.eval(&buffer) {
                    Ok(val) => println!("{val}"),
                    Err(e) => {
                        eprintln!("{}", e.user_message());
                        if buffer.lines().count() == 1 {
                            eprintln!("  at: {}", buffer.trim());
                        } else {
                            eprintln!("  in:");
                            for line in buffer.lines() {
                                eprintln!("    {line}");
                            }
                        }
                    }
                }

                buffer.clear();
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                buffer.clear();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye");
                break;
            }
            Err(err) => {
                eprintln!("Readline error: {err}");
                break;
            }
        }
    }

    if let Some(ref p) = history_path {
        rl.save_history(p)?;
    }
    Ok(())
}
