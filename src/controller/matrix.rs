// File: matrix.rs
// Square distance matrices and their plain-text form.
//
// Text layout: one row per line, values separated by single spaces and
// written as `{:.18e}`. Files ending in `.gz` are gzip-compressed.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use regex::Regex;

use crate::annotation::ChainRole;
use crate::error::{LoopwarpError, Result};

pub const STRUCTURE_NAMES_FILE: &str = "structure_names.txt";

/// N x N matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// All-zero matrix
    pub fn zeros(n: usize) -> Self {
        DistanceMatrix { n, data: vec![0.0; n * n] }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(LoopwarpError::Parse(format!(
                    "matrix row {} has {} values, expected {}", i, row.len(), n
                )));
            }
            data.extend(row);
        }
        Ok(DistanceMatrix { n, data })
    }

    pub fn size(&self) -> usize {
        self.n
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Set both `(i, j)` and `(j, i)`
    pub fn set_symmetric(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.n + j] = value;
        self.data[j * self.n + i] = value;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| self.get(i, i) == 0.0 && (0..i).all(|j| self.get(i, j) == self.get(j, i)))
    }

    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.n * self.n * 26);
        for i in 0..self.n {
            let row: Vec<String> = self.row(i).iter().map(|v| format!("{:.18e}", v)).collect();
            out.push_str(&row.join(" "));
            out.push('\n');
        }
        out
    }

    /// Parse whitespace separated rows. Blank lines are ignored.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let row = line
                .split_whitespace()
                .map(parse_value)
                .collect::<Result<Vec<f64>>>()?;
            rows.push(row);
        }
        DistanceMatrix::from_rows(rows)
    }
}

fn parse_value(token: &str) -> Result<f64> {
    match token {
        "inf" | "+inf" | "Infinity" => Ok(f64::INFINITY),
        _ => token
            .parse::<f64>()
            .map_err(|_| LoopwarpError::Parse(format!("bad matrix value '{}'", token))),
    }
}

fn is_gz(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("gz")
}

pub fn write_matrix<P: AsRef<Path>>(path: P, matrix: &DistanceMatrix) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let text = matrix.to_text();
    if is_gz(path) {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        encoder.write_all(text.as_bytes())?;
        encoder.finish()?.flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
    }
    Ok(())
}

pub fn read_matrix<P: AsRef<Path>>(path: P) -> Result<DistanceMatrix> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut text = String::new();
    if is_gz(path) {
        GzDecoder::new(file).read_to_string(&mut text)?;
    } else {
        BufReader::new(file).read_to_string(&mut text)?;
    }
    DistanceMatrix::from_text(&text)
}

/// `cdr{n}_{alpha|beta}_distance_matrix.txt`, with `.gz` when compressed
pub fn matrix_file_name(chain_role: ChainRole, cdr: u8, compress: bool) -> String {
    let mut name = format!("cdr{}_{}_distance_matrix.txt", cdr, chain_role.short_name());
    if compress {
        name.push_str(".gz");
    }
    name
}

/// Recover (chain role, CDR) from a matrix file name or path.
pub fn parse_matrix_file_name(path: &str) -> Result<(ChainRole, u8)> {
    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    let re = Regex::new(r"^cdr([123])_(alpha|beta)_distance_matrix\.txt(\.gz)?$")
        .map_err(|e| LoopwarpError::InvalidInput(e.to_string()))?;
    let caps = re.captures(file_name).ok_or_else(|| {
        LoopwarpError::InvalidInput(format!("'{}' is not a distance matrix file name", file_name))
    })?;
    let cdr = caps[1]
        .parse::<u8>()
        .map_err(|_| LoopwarpError::Parse(caps[1].to_string()))?;
    let role = ChainRole::get_with_str(&caps[2])
        .ok_or_else(|| LoopwarpError::Parse(caps[2].to_string()))?;
    Ok((role, cdr))
}

pub fn write_structure_names<P: AsRef<Path>>(path: P, names: &[String]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for name in names {
        writeln!(writer, "{}", name)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_structure_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut names = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let name = line.trim();
        if !name.is_empty() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}
