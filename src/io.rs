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

use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::io::stdout;
use std::path::Path;

use serde_derive::Serialize;

use crate::error::CfError;
use crate::predict::Prediction;
use crate::store::UNRATED;
use crate::types::{EntityId, Triple};
use crate::BatchPrediction;

/// Reader configuration for our input files. We expect NO headers and one record per line,
/// separated by tabs. Fields may additionally be separated by spaces, and records may carry
/// trailing fields (e.g. timestamps), which we ignore.
pub fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .quoting(false);

    builder
}

pub fn csv_reader(file: &str) -> Result<csv::Reader<File>, csv::Error> {
    reader_builder().from_path(file)
}

/// Parses (user, item, rating) triples, one per record.
pub fn ratings_from_csv<'a, R>(
    reader: &'a mut csv::Reader<R>
) -> impl Iterator<Item=Result<Triple, CfError>> + 'a
    where R: io::Read {

    reader.records().map(|result| -> Result<Triple, CfError> {
        let record = result?;
        parse_triple(&fields_of(&record), line_of(&record))
    })
}

/// Parses (user, item) pairs to predict for, one per record.
pub fn queries_from_csv<'a, R>(
    reader: &'a mut csv::Reader<R>
) -> impl Iterator<Item=Result<(EntityId, EntityId), CfError>> + 'a
    where R: io::Read {

    reader.records().map(|result| -> Result<(EntityId, EntityId), CfError> {
        let record = result?;
        parse_query(&fields_of(&record), line_of(&record))
    })
}

fn fields_of(record: &csv::StringRecord) -> Vec<&str> {
    record.iter()
        .flat_map(|field| field.split_whitespace())
        .collect()
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map_or(0, |position| position.line())
}

pub fn parse_triple(fields: &[&str], line: u64) -> Result<Triple, CfError> {

    expect_fields(fields, 3, line)?;

    let user = parse_id(fields[0], "user id", line)?;
    let item = parse_id(fields[1], "item id", line)?;
    let rating = parse_id(fields[2], "rating", line)?;

    if rating == UNRATED {
        return Err(CfError::MalformedInput {
            line,
            reason: format!("rating {} is reserved for missing ratings", UNRATED),
        });
    }

    Ok((user, item, rating))
}

pub fn parse_query(fields: &[&str], line: u64) -> Result<(EntityId, EntityId), CfError> {

    expect_fields(fields, 2, line)?;

    let user = parse_id(fields[0], "user id", line)?;
    let item = parse_id(fields[1], "item id", line)?;

    Ok((user, item))
}

fn expect_fields(fields: &[&str], num_fields: usize, line: u64) -> Result<(), CfError> {
    if fields.len() < num_fields {
        Err(CfError::MalformedInput {
            line,
            reason: format!("expected at least {} fields, found {}", num_fields, fields.len()),
        })
    } else {
        Ok(())
    }
}

fn parse_id(field: &str, name: &str, line: u64) -> Result<u32, CfError> {
    field.parse::<u32>()
        .map_err(|failure| CfError::MalformedInput {
            line,
            reason: format!("invalid {} '{}': {}", name, field, failure),
        })
}

/// Either side of a batch result. Field names will be used in JSON.
#[derive(Serialize)]
#[serde(untagged)]
enum Outcome<'a> {
    Predicted(&'a Prediction),
    Failed { error: String },
}

impl<'a> From<&'a Result<Prediction, CfError>> for Outcome<'a> {
    fn from(result: &'a Result<Prediction, CfError>) -> Self {
        match *result {
            Ok(ref prediction) => Outcome::Predicted(prediction),
            Err(ref failure) => Outcome::Failed { error: failure.to_string() },
        }
    }
}

#[derive(Serialize)]
struct BatchLine<'a> {
    user: EntityId,
    item: EntityId,
    user_based: Outcome<'a>,
    item_based: Outcome<'a>,
}

fn output(path: Option<String>) -> io::Result<Box<dyn Write>> {
    let out: Box<dyn Write> = match path {
        Some(path) => Box::new(File::create(&Path::new(&path))?),
        _ => Box::new(stdout())
    };

    Ok(out)
}

/// Output predictions in JSON format, one per line. If an `output_path` is supplied, we write
/// to a file at the specified path, otherwise, we output to stdout.
pub fn write_predictions(
    predictions: &[Prediction],
    output_path: Option<String>,
) -> io::Result<()> {

    let mut out = output(output_path)?;
    write_predictions_to(&mut out, predictions)
}

pub fn write_predictions_to<W: Write>(
    out: &mut W,
    predictions: &[Prediction],
) -> io::Result<()> {

    for prediction in predictions.iter() {
        serde_json::to_writer(&mut *out, prediction)?;
        writeln!(out)?;
    }

    Ok(())
}

/// Output batch results in JSON format, one line per query, with failures reported inline.
pub fn write_batch(
    results: &[BatchPrediction],
    output_path: Option<String>,
) -> io::Result<()> {

    let mut out = output(output_path)?;
    write_batch_to(&mut out, results)
}

pub fn write_batch_to<W: Write>(out: &mut W, results: &[BatchPrediction]) -> io::Result<()> {
    for result in results.iter() {
        let line = BatchLine {
            user: result.user,
            item: result.item,
            user_based: Outcome::from(&result.user_based),
            item_based: Outcome::from(&result.item_based),
        };

        serde_json::to_writer(&mut *out, &line)?;
        writeln!(out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {

    use serde_json::Value;

    use crate::error::CfError;
    use crate::io;
    use crate::store::RatingMatrix;
    use crate::{predict_batch, predict_user_based};

    fn json_lines(buffer: Vec<u8>) -> Vec<Value> {
        String::from_utf8(buffer).unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn matrix() -> RatingMatrix {
        // User 4 only rated item 30
        RatingMatrix::build(&vec![(1, 10, 5), (1, 30, 3), (2, 10, 4), (2, 20, 5), (4, 30, 2)])
    }

    #[test]
    fn predictions_as_json_lines() {
        let prediction = predict_user_based(&matrix(), 1, 30, 2).unwrap();

        let mut buffer = Vec::new();
        io::write_predictions_to(&mut buffer, &[prediction.clone(), prediction]).unwrap();

        let lines = json_lines(buffer);
        assert_eq!(lines.len(), 2);

        let line = &lines[0];
        assert_eq!(line["axis"], "user");
        assert_eq!(line["subject"], 1);
        assert_eq!(line["target"], 30);
        assert_eq!(line["neighborhood"][0]["id"], 2);
        assert_eq!(line["neighborhood"][0]["rating"], Value::Null);
        assert!(line["neighborhood"][0]["similarity"].is_f64());
        assert!(line["neighborhood"][0]["average"].is_f64());
        assert_eq!(line["subject_average"], 2.5);
        assert_eq!(line["predicted"], -0.5);
        assert_eq!(line["undefined"][0], 4);
    }

    #[test]
    fn batch_failures_reported_inline() {
        let results = predict_batch(&matrix(), &[(1, 30), (9, 30)], 2, 2);

        let mut buffer = Vec::new();
        io::write_batch_to(&mut buffer, &results).unwrap();

        let lines = json_lines(buffer);
        assert_eq!(lines.len(), 2);

        assert_eq!(lines[0]["user"], 1);
        assert_eq!(lines[0]["item"], 30);
        assert_eq!(lines[0]["user_based"]["predicted"], -0.5);
        assert!(lines[0]["item_based"].is_object());

        assert_eq!(lines[1]["user"], 9);
        assert_eq!(lines[1]["user_based"]["error"], "unknown user 9");
        assert_eq!(lines[1]["item_based"]["error"], "unknown user 9");
    }

    fn parse(data: &str) -> Result<Vec<(u32, u32, u32)>, CfError> {
        let mut reader = io::reader_builder().from_reader(data.as_bytes());
        let triples = io::ratings_from_csv(&mut reader).collect();
        triples
    }

    #[test]
    fn tab_separated_with_trailing_fields() {
        let triples = parse("196\t242\t3\t881250949\n186\t302\t3\t891717742\n").unwrap();

        assert_eq!(triples, vec![(196, 242, 3), (186, 302, 3)]);
    }

    #[test]
    fn whitespace_separated() {
        let triples = parse("1 10 5\n2  20\t4\n").unwrap();

        assert_eq!(triples, vec![(1, 10, 5), (2, 20, 4)]);
    }

    #[test]
    fn malformed_records_report_their_line() {
        match parse("1\t10\t5\n2\tx\t4\n") {
            Err(CfError::MalformedInput { line: 2, ref reason }) =>
                assert!(reason.contains("item id")),
            other => panic!("unexpected result {:?}", other),
        }

        match parse("1\t10\n") {
            Err(CfError::MalformedInput { line: 1, .. }) => {},
            other => panic!("unexpected result {:?}", other),
        }

        match parse("1\t10\t-3\n") {
            Err(CfError::MalformedInput { line: 1, .. }) => {},
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn zero_ratings_are_rejected() {
        match io::parse_triple(&["1", "10", "0"], 7) {
            Err(CfError::MalformedInput { line: 7, .. }) => {},
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn queries() {
        let mut reader = io::reader_builder().from_reader("1\t30\n2 10 ignored\n".as_bytes());

        let queries: Vec<(u32, u32)> = io::queries_from_csv(&mut reader)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(queries, vec![(1, 30), (2, 10)]);
    }
}
