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
use cofi::RatingMatrix;

fn main() {

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("i", "inputfile", "Input file name (required). The input consists of ratings \
        of items by users. The input file must contain a user, item and rating per line, \
        separated by tabs or spaces. Further fields per line are ignored.", "PATH");
    opts.optopt("u", "user", "Id of the user to predict a rating for (required).", "ID");
    opts.optopt("t", "item", "Id of the item to predict a rating for (required).", "ID");
    opts.optopt("n", "neighborhood-size", "Number of most similar users and items to predict \
        from (optional, defaults to 2).", "NUMBER");
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

    let ratings_path = match matches.opt_str("i") {
        Some(path) => path,
        None => return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify an inputfile via --inputfile."),
        ),
    };

    let user: u32 = match matches.opt_get("u") {
        Ok(Some(user)) => user,
        Ok(None) => return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify a user via --user."),
        ),
        Err(failure) => {
            let hint = format!("Problem with option 'u': {}", failure);
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    let item: u32 = match matches.opt_get("t") {
        Ok(Some(item)) => item,
        Ok(None) => return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify an item via --item."),
        ),
        Err(failure) => {
            let hint = format!("Problem with option 't': {}", failure);
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    let n: usize = match matches.opt_get_default("n", 2) {
        Ok(n) => n,
        Err(failure) => {
            let hint = format!("Problem with option 'n': {}", failure);
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    let output_path = matches.opt_str("o");

    if let Err(failure) = predict(&ratings_path, user, item, n, output_path) {
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

fn predict(
    ratings_path: &str,
    user: u32,
    item: u32,
    n: usize,
    output_path: Option<String>
) -> Result<(), Box<dyn Error>> {

    println!("Reading {} to build the rating matrix", ratings_path);

    let mut reader = io::csv_reader(ratings_path)?;
    let matrix = RatingMatrix::from_records(io::ratings_from_csv(&mut reader))?;

    let data_dict = matrix.data_dictionary();
    println!(
        "Found {} ratings between {} users and {} items.",
        data_dict.num_ratings(),
        data_dict.num_users(),
        data_dict.num_items(),
    );

    println!("Predicting the rating of user {} for item {} from {} neighbors", user, item, n);

    if let Some(rating) = matrix.rating(user, item)? {
        println!("User {} already rated item {} with {}, predicting it anyway", user, item, rating);
    }

    let user_based = cofi::predict_user_based(&matrix, user, item, n)?;
    let item_based = cofi::predict_item_based(&matrix, item, user, n)?;

    for failure in user_based.undefined_pairs().chain(item_based.undefined_pairs()) {
        println!("Skipped: {}", failure);
    }

    io::write_predictions(&[user_based, item_based], output_path)?;

    Ok(())
}
