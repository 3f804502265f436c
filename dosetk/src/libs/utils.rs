use color_eyre::Result;

use crate::error::DoseError::SnpIdFormat;

// Ids are in the format [digits]:[digits]
pub fn parse_snp_id(id: &str) -> Result<(&str, u64)> {
    let mut split = id.split(':');

    match (split.next(), split.next(), split.next()) {
        (Some(contig), Some(pos), None) if is_digits(contig) && is_digits(pos) => {
            let pos = pos.parse::<u64>().map_err(|_| SnpIdFormat(id.into()))?;
            Ok((contig, pos))
        }
        _ => Err(SnpIdFormat(id.into()).into()),
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// File names are in the format chr[id].[anything], i.e. chr22.dose.vcf.gz
pub fn chromosome_from_filename(name: &str) -> Option<&str> {
    let rest = name.strip_prefix("chr")?;
    let id = rest.split('.').next()?;

    match id.is_empty() {
        true => None,
        false => Some(id),
    }
}

pub fn alleles_match(reference: &str, alt: &str, a1: &str, a2: &str) -> bool {
    let eq = |x: &str, y: &str| x.eq_ignore_ascii_case(y);
    (eq(reference, a1) && eq(alt, a2)) || (eq(reference, a2) && eq(alt, a1))
}
