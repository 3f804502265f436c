use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use csv::{QuoteStyle, Reader, ReaderBuilder, Writer, WriterBuilder};

use crate::error::DoseError::{EmptySnpList, FileNotFound, SnpColumnCount};
use crate::structs::SnpRequest;
use crate::utils::parse_snp_id;

pub fn check_existence(path: &Path) -> Result<()> {
    match path.is_file() {
        true => Ok(()),
        false => Err(FileNotFound(path.to_path_buf()).into()),
    }
}

/// Read a headerless, whitespace delimited SNP list with columns id, effect allele, noneffect allele, ...
pub fn read_snp_list(path: &Path) -> Result<Vec<SnpRequest>> {
    check_existence(path)?;

    let mut requests = vec![];

    for (i, line) in read_lines(path)?.enumerate() {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();

        if fields.is_empty() {
            continue;
        }

        if fields.len() < 3 {
            return Err(SnpColumnCount((i + 1, fields.len())).into());
        }

        let (contig, pos) = parse_snp_id(fields[0])?;

        requests.push(SnpRequest {
            id: fields[0].to_string(),
            contig: contig.to_string(),
            pos,
            effect_allele: fields[1].to_string(),
            other_allele: fields[2].to_string(),
            extra: fields[3..].iter().map(|s| s.to_string()).collect(),
        });
    }

    if requests.is_empty() {
        return Err(EmptySnpList(path.to_path_buf()).into());
    }

    Ok(requests)
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).wrap_err(eyre!("Error creating directory {path:?}"))
}

pub fn read_lines<P>(filename: P) -> Result<io::Lines<BufReader<Box<dyn io::Read>>>>
where
    P: AsRef<Path>,
{
    let input = get_input(Some(filename.as_ref().to_path_buf()))?;
    Ok(BufReader::new(input).lines())
}

pub fn count_lines<P>(filename: P, skip: impl Fn(&str) -> bool) -> Result<usize>
where
    P: AsRef<Path>,
{
    let mut n = 0;
    for line in read_lines(filename)? {
        let line = line?;
        if !skip(line.as_str()) {
            n += 1;
        }
    }
    Ok(n)
}

pub fn get_tsv_reader<R: io::Read>(input: R, has_headers: bool) -> Reader<R> {
    ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(input)
}

pub fn get_strict_tsv_writer<W: io::Write>(output: W) -> Writer<W> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(false)
        .quote_style(QuoteStyle::Never)
        .from_writer(output)
}

pub fn get_report_writer<W: io::Write>(output: W) -> Writer<W> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_writer(output)
}

pub fn get_input(filename: Option<PathBuf>) -> Result<Box<dyn io::Read>> {
    let input: Box<dyn io::Read> = match filename {
        Some(name) => match name.to_str() {
            Some("-") => Box::new(io::stdin()),
            // Too short for niffler to sniff a compression format
            Some(name) if std::fs::metadata(name).is_ok_and(|m| m.len() < 5) => {
                Box::new(File::open(name).wrap_err(eyre!("failed to open \"{name}\""))?)
            }
            Some(name) => {
                let r = match niffler::from_path(name) {
                    Ok(x) => x.0,
                    Err(err) => {
                        let msg = format!("failed to open \"{name}\": {err}");
                        return Err(eyre!(msg))?;
                    }
                };
                Box::new(r)
            }
            None => return Err(eyre!("Unknown I/O error")),
        },
        None => Box::new(io::stdin()),
    };
    Ok(input)
}

pub fn get_output(filename: Option<PathBuf>) -> Result<Box<dyn io::Write>> {
    let output: Box<dyn io::Write> = match filename {
        Some(name) => match name.to_str() {
            Some("-") => Box::new(io::stdout()),
            Some(name) => Box::new(
                match File::options()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(name)
                {
                    Ok(x) => io::BufWriter::new(x),
                    Err(err) => return Err(eyre!("failed to open \"{name}\": {err}"))?,
                },
            ),
            None => return Err(eyre!("Unknown I/O error")),
        },
        None => Box::new(io::stdout()),
    };
    Ok(output)
}

pub fn get_appender(filename: &Path) -> Result<io::BufWriter<File>> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(filename)
        .wrap_err(eyre!("failed to open {filename:?} for appending"))?;
    Ok(io::BufWriter::new(file))
}

pub fn open_strict_tsv_writer(name: PathBuf) -> Result<Writer<Box<dyn io::Write>>> {
    Ok(get_strict_tsv_writer(get_output(Some(name))?))
}

pub fn append_ext(ext: impl AsRef<OsStr>, path: &PathBuf) -> PathBuf {
    let mut os_string: OsString = path.into();
    os_string.push(".");
    os_string.push(ext.as_ref());
    os_string.into()
}

pub fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).wrap_err(eyre!("failed to remove {path:?}")),
    }
}
