use pokemon_learnset_core::{logger, parse_move_list, run, CliOptions, CombatantSpec, Command, DexScope};
use std::env;
use std::path::PathBuf;

fn usage() -> ! {
    eprintln!(
        "Usage: cargo run --release -- [--data-dir data] [--dex-scope 151|386] [--verbose] <command>\n\
Commands:\n  learnset <species>\n  legal <species>\n  prefill <species> <level>\n  evos <species>\n  allowed\n  \
matchup <my-species> <my-level> <their-species> <their-level> [--my-moves Name[:Type],..] [--their-moves Name[:Type],..]"
    );
    std::process::exit(1);
}

fn next_value(args: &mut impl Iterator<Item = String>, what: &str) -> anyhow::Result<String> {
    args.next()
        .ok_or_else(|| anyhow::anyhow!("{what} is required"))
}

fn parse_level(raw: &str) -> anyhow::Result<u32> {
    let level: u32 = raw
        .parse()
        .map_err(|_| anyhow::anyhow!("level must be a number, got {raw}"))?;
    if !(1..=100).contains(&level) {
        anyhow::bail!("level must be between 1 and 100, got {level}");
    }
    Ok(level)
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut data_dir = PathBuf::from("data");
    let mut dex_scope = DexScope::default();
    let mut verbose = false;
    let mut my_moves = Vec::new();
    let mut their_moves = Vec::new();
    let mut positional: Vec<String> = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                data_dir = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--data-dir requires a path (e.g. --data-dir data)")
                })?;
            }
            "--dex-scope" => {
                let val = next_value(&mut args, "--dex-scope value (151 or 386)")?;
                dex_scope = val.parse()?;
            }
            "--my-moves" => {
                my_moves = parse_move_list(&next_value(&mut args, "--my-moves list")?);
            }
            "--their-moves" => {
                their_moves = parse_move_list(&next_value(&mut args, "--their-moves list")?);
            }
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => usage(),
            other if other.starts_with("--") => {
                return Err(anyhow::anyhow!("Unknown argument {other}"))
            }
            _ => positional.push(arg),
        }
    }

    let mut rest = positional.into_iter();
    let Some(name) = rest.next() else { usage() };
    let command = match name.as_str() {
        "learnset" => Command::Learnset {
            species: next_value(&mut rest, "species")?,
        },
        "legal" => Command::Legal {
            species: next_value(&mut rest, "species")?,
        },
        "prefill" => Command::Prefill {
            species: next_value(&mut rest, "species")?,
            level: parse_level(&next_value(&mut rest, "level")?)?,
        },
        "evos" => Command::Evos {
            species: next_value(&mut rest, "species")?,
        },
        "allowed" => Command::Allowed,
        "matchup" => {
            let mine = CombatantSpec {
                species: next_value(&mut rest, "my species")?,
                level: parse_level(&next_value(&mut rest, "my level")?)?,
                moves: my_moves,
            };
            let theirs = CombatantSpec {
                species: next_value(&mut rest, "their species")?,
                level: parse_level(&next_value(&mut rest, "their level")?)?,
                moves: their_moves,
            };
            Command::Matchup { mine, theirs }
        }
        other => anyhow::bail!("Unknown command {other}"),
    };
    if let Some(extra) = rest.next() {
        anyhow::bail!("Unexpected argument {extra}");
    }

    Ok(CliOptions {
        data_dir,
        dex_scope,
        verbose,
        command,
    })
}

fn main() -> anyhow::Result<()> {
    let opts = parse_args()?;
    logger::init(opts.verbose)?;
    run(opts)
}
