/**
 * Cofi
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::env;
use std::error::Error;

use getopts::Options;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cofi::io;
use cofi::{CfError, RatingMatrix};

fn main() {

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("i", "inputfile", "Input file name (required). The input must contain a user, \
        item and rating per line, separated by tabs or spaces.", "PATH");
    opts.optopt("q", "queries", "Queries file name (required). The queries file must contain a \
        user and item pair per line, separated by tabs or spaces.", "PATH");
    opts.optopt("n", "neighborhood-size", "Number of most similar users and items to predict \
        from (optional, defaults to 2).", "NUMBER");
    opts.optopt("p", "pool-size", "Number of threads to use (optional, defaults to the number \
        of CPUs).", "NUMBER");
    opts.optopt("o", "outputfile", "Output file name (optional, output will be written to stdout \
        by default).", "PATH");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        return print_usage_and_exit(&program, opts, None);
    }

    let (ratings_path, queries_path) = match (matches.opt_str("i"), matches.opt_str("q")) {
        (Some(ratings_path), Some(queries_path)) => (ratings_path, queries_path),
        _ => return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify an inputfile via --inputfile and queries via --queries."),
        ),
    };

    let n: usize = match matches.opt_get_default("n", 2) {
        Ok(n) => n,
        Err(failure) => {
            let hint = format!("Problem with option 'n': {}", failure);
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    let pool_size: usize = match matches.opt_get_default("p", num_cpus::get()) {
        Ok(pool_size) => pool_size,
        Err(failure) => {
            let hint = format!("Problem with option 'p': {}", failure);
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    let output_path = matches.opt_str("o");

    if let Err(failure) = predict_all(&ratings_path, &queries_path, n, pool_size, output_path) {
        eprintln!("{}", failure);
        std::process::exit(1);
    }
}

fn print_usage_and_exit(
    program: &str,
    opts: Options,
    hint: Option<&str>
) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));
    std::process::exit(1);
}

fn predict_all(
    ratings_path: &str,
    queries_path: &str,
    n: usize,
    pool_size: usize,
    output_path: Option<String>
) -> Result<(), Box<dyn Error>> {

    println!("Reading {} to build the rating matrix (pass 1/2)", ratings_path);

    let mut ratings_reader = io::csv_reader(ratings_path)?;
    let matrix = RatingMatrix::from_records(io::ratings_from_csv(&mut ratings_reader))?;

    let data_dict = matrix.data_dictionary();
    println!(
        "Found {} ratings between {} users and {} items.",
        data_dict.num_ratings(),
        data_dict.num_users(),
        data_dict.num_items(),
    );

    println!("Reading {} to load the queries (pass 2/2)", queries_path);

    let mut queries_reader = io::csv_reader(queries_path)?;
    let queries = io::queries_from_csv(&mut queries_reader)
        .collect::<Result<Vec<(u32, u32)>, CfError>>()?;

    println!(
        "Predicting {} queries from {} neighbors using {} threads",
        queries.len(),
        n,
        pool_size,
    );

    let results = cofi::predict_batch(&matrix, &queries, n, pool_size);

    println!("Writing predictions...");
    io::write_batch(&results, output_path)?;

    Ok(())
}
