use clap::{Parser, Subcommand, ValueEnum};
use odt_search::cache::Trie;
use odt_search::cover::BitsetCover;
use odt_search::data::BinaryDataset;
use odt_search::engine::{Dl85Builder, SearchHeuristic};
use odt_search::heuristics::{Heuristic, InformationGain, NoHeuristic};
use odt_search::query::ClassificationQuery;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[clap(name = "odt-search", version, author, about)]
struct App {
    /// Dataset input file path
    #[clap(short, long, value_parser)]
    input: PathBuf,

    #[clap(subcommand)]
    command: Command,

    /// Print search statistics
    #[arg(long, default_value_t = false)]
    print_stats: bool,

    /// Print the learned tree
    #[arg(long, default_value_t = false)]
    print_tree: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Branch-and-bound search for the error-optimal decision tree.
    Dl85 {
        /// Minimum transaction support for a split to be considered
        #[arg(short, long, default_value_t = 1)]
        support: usize,

        /// Maximum tree depth
        #[arg(short, long)]
        depth: usize,

        /// Initial upper bound on tree error
        #[arg(long, default_value_t = <f64>::INFINITY)]
        max_error: f64,

        /// Maximum time allowed for the search, in seconds
        #[clap(long, short)]
        timeout: Option<f64>,

        /// Successor ordering heuristic
        #[arg(long, value_enum, default_value_t = ArgHeuristic::None)]
        heuristic: ArgHeuristic,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ArgHeuristic {
    InformationGain,
    None,
}

impl From<ArgHeuristic> for SearchHeuristic {
    fn from(value: ArgHeuristic) -> Self {
        match value {
            ArgHeuristic::InformationGain => SearchHeuristic::InformationGain,
            ArgHeuristic::None => SearchHeuristic::None_,
        }
    }
}

fn heuristic_for(arg: ArgHeuristic) -> Box<dyn Heuristic> {
    match arg {
        ArgHeuristic::InformationGain => Box::new(InformationGain),
        ArgHeuristic::None => Box::new(NoHeuristic),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let app = App::parse();

    let dataset = BinaryDataset::read(
        app.input
            .to_str()
            .ok_or("input path is not valid UTF-8")?,
    )?;
    log::info!(
        "loaded {} transactions, {} attributes, {} classes from {}",
        dataset.rows.len(),
        dataset.num_attributes,
        dataset.num_classes,
        app.input.display()
    );
    let mut cover = BitsetCover::new(&dataset.rows, &dataset.labels, dataset.num_classes);

    let Command::Dl85 {
        support,
        depth,
        max_error,
        timeout,
        heuristic,
    } = app.command;

    let max_time = timeout.map_or(Duration::from_secs(600), Duration::from_secs_f64);

    let mut learner = Dl85Builder::new()
        .min_support(support)
        .max_depth(depth)
        .max_error(max_error)
        .max_time(max_time)
        .search_heuristic(heuristic.into())
        .cache(Box::new(Trie::new()))
        .query(Box::new(ClassificationQuery))
        .heuristic(heuristic_for(heuristic))
        .build()?;

    learner.fit(&mut cover)?;

    if app.print_stats {
        println!("{:#?}", learner.statistics);
    }
    if app.print_tree {
        learner.tree.print();
    }

    Ok(())
}
