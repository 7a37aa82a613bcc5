extern crate clap;

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use clap::{arg, command, Parser, ValueEnum};
use colored::Colorize;
use mtdv::{
    export::{dot, json},
    graph, lexer, Encoding, Error,
};

/// MTdV Turing machine program to control flow graph compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The file to operate on
    #[arg()]
    file: PathBuf,

    /// What to produce, `json` and `dot` when none are given
    #[arg(value_enum)]
    commands: Vec<Commands>,

    /// Directory the output files are written to
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Encoding::Latin1)]
    encoding: Encoding,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, Hash, PartialEq, Eq)]
enum Commands {
    /// Output the tokens
    Tokens,
    /// Output the graph
    Graph,
    /// Write <file>.json
    Json,
    /// Write <file>.dot
    Dot,
    /// Render <file>.png with graphviz
    Png,
}

struct Driver {
    args: Args,
    commands: HashSet<Commands>,
}

impl Driver {
    fn new(args: Args) -> Self {
        let mut commands: HashSet<Commands> = HashSet::from_iter(args.commands.iter().cloned());
        if commands.is_empty() {
            commands.insert(Commands::Json);
            commands.insert(Commands::Dot);
        }
        Self { args, commands }
    }

    fn status(&self, message: impl std::fmt::Display) {
        if !self.args.quiet {
            println!("{}", message);
        }
    }

    /// `<output>/<file stem>.<extension>`
    fn output_path(&self, extension: &str) -> PathBuf {
        let mut name = self.args.file.file_stem().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(extension);
        let dir = self.args.output.as_deref().unwrap_or(Path::new("."));
        dir.join(name)
    }

    fn run(&self) -> Result<(), Error> {
        self.status(format!("Running {}", self.args.file.display()));

        let bytes = std::fs::read(&self.args.file)?;
        let text = self.args.encoding.decode(&bytes);

        self.status("Starting lexing".blue());
        let now = Instant::now();
        let tokens = lexer::tokenize(&text)?;
        self.status(format!("{} {:.2?}", "Finished lexing in".green(), now.elapsed()));

        if self.commands.contains(&Commands::Tokens) {
            let printed: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
            println!("{}", printed.join(" "));
        }

        self.status("Starting graph building".blue());
        let now = Instant::now();
        let graph = graph::build(&tokens)?;
        self.status(format!(
            "{} {} nodes in {:.2?}",
            "Finished graph building with".green(),
            graph.len(),
            now.elapsed()
        ));

        if self.commands.contains(&Commands::Graph) {
            println!("{:#?}", graph);
        }

        if let Some(dir) = &self.args.output {
            std::fs::create_dir_all(dir)?;
        }

        if self.commands.contains(&Commands::Json) {
            let path = self.output_path("json");
            json::write(&graph, &path)?;
            self.status(format!("{} {}", "Wrote".green(), path.display()));
        }

        if self.commands.contains(&Commands::Dot) {
            let path = self.output_path("dot");
            dot::write(&graph, &path)?;
            self.status(format!("{} {}", "Wrote".green(), path.display()));
        }

        if self.commands.contains(&Commands::Png) {
            self.status(format!("{} {}", "Starting".blue(), dot::RENDERER));
            let now = Instant::now();
            let path = self.output_path("png");
            dot::render_png(&graph, &path)?;
            self.status(format!(
                "{} {} in {:.2?}",
                "Rendered".green(),
                path.display(),
                now.elapsed()
            ));
        }

        Ok(())
    }
}

fn main() -> ExitCode {
    let driver = Driver::new(Args::parse());

    match driver.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{0:}: {1:}", "Error".red(), e);
            ExitCode::FAILURE
        }
    }
}
