use clap::{App, Arg};
use propsat::*;
use std::fs::File;

fn main() {
    env_logger::init();

    let matches = App::new("propsat")
        .about("Checks satisfiability of a propositional sentence")
        .arg(Arg::with_name("SENTENCE").help("sentence to check, e.g. \"(p & q) | ~r\"").index(1))
        .arg(
            Arg::with_name("file")
                .short("f")
                .long("file")
                .takes_value(true)
                .conflicts_with("SENTENCE")
                .help("read the sentence from a file"),
        )
        .arg(
            Arg::with_name("max-variables")
                .long("max-variables")
                .takes_value(true)
                .help("refuse to search sentences with more variables than this"),
        )
        .arg(Arg::with_name("tokens").long("tokens").help("print the token stream and exit"))
        .arg(Arg::with_name("all").long("all").help("print every satisfying assignment"))
        .get_matches();

    let mut config = SearchConfig::default();
    if let Some(max) = matches.value_of("max-variables") {
        match max.parse() {
            Ok(max) => config = config.max_variables(max),
            Err(_) => {
                eprintln!("invalid --max-variables: {}", max);
                std::process::exit(-1);
            }
        }
    }

    let sentence = matches.value_of("SENTENCE");
    let path = matches.value_of("file");

    if matches.is_present("tokens") {
        match read_input(sentence, path) {
            Ok(input) => {
                for token in Tokenizer::new(&input) {
                    println!("{:?}", token);
                }
            }
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(-1);
            }
        }
        return;
    }

    let parsed = match (sentence, path) {
        (Some(sentence), _) => parse(sentence),
        (None, Some(path)) => parse_file(path),
        (None, None) => parse_reader(std::io::stdin()),
    };
    let parsed = match parsed {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("parse error: {}", e);
            std::process::exit(-1);
        }
    };
    println!("{}", parsed.root());

    match Search::new(&parsed).config(config).run() {
        Ok(solutions) => {
            if matches.is_present("all") {
                for assignment in solutions.iter() {
                    println!("{}", assignment);
                }
            }
            let exit_code = if solutions.is_tautology() {
                println!("tautology");
                0
            } else if solutions.is_satisfiable() {
                println!("satisfiable ({} of {})", solutions.len(), solutions.examined());
                0
            } else {
                println!("unsatisfiable");
                1
            };
            std::process::exit(exit_code);
        }
        Err(e) => {
            eprintln!("search error: {}", e);
            std::process::exit(-1);
        }
    }
}

// Only `--tokens` needs the raw text.
fn read_input(sentence: Option<&str>, path: Option<&str>) -> Result<String, std::io::Error> {
    use std::io::Read;

    if let Some(sentence) = sentence {
        return Ok(sentence.to_string());
    }
    let mut input = String::new();
    match path {
        Some(path) => File::open(path)?.read_to_string(&mut input)?,
        None => std::io::stdin().read_to_string(&mut input)?,
    };
    Ok(input)
}
