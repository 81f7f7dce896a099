use std::io::Write;
use std::str::FromStr;

use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

const GZIP_DEFAULT_LEVEL: u8 = 6;
const LZ4_DEFAULT_LEVEL: u8 = 0;
const ZSTD_DEFAULT_LEVEL: u8 = 0;

/// Compression format
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Compression {
    /// The bzip2 format
    Bzip2,
    /// The gzip format with compression level as associated value
    Gzip(u8),
    /// The lz4 format with compression level as associated value
    Lz4(u8),
    /// The zstd format with compression level as associated value
    Zstd(u8),
}

/// Convert into a writer that compresses to the given format
///
/// The compressed stream is only complete after [CompressWriter::finish].
pub fn compress_writer<W: Write>(
    writer: W,
    compression: Option<Compression>,
) -> Result<CompressWriter<W>, std::io::Error> {
    let writer = match compression {
        Some(Compression::Bzip2) => CompressWriter::Bzip2(BzEncoder::new(
            writer,
            bzip2::Compression::best(),
        )),
        Some(Compression::Gzip(lvl)) => CompressWriter::Gzip(GzEncoder::new(
            writer,
            flate2::Compression::new(lvl.into()),
        )),
        Some(Compression::Lz4(lvl)) => {
            let encoder = lz4::EncoderBuilder::new()
                .auto_flush(true)
                .level(lvl.into())
                .build(writer)?;
            CompressWriter::Lz4(encoder)
        }
        Some(Compression::Zstd(lvl)) => {
            CompressWriter::Zstd(zstd::Encoder::new(writer, lvl.into())?)
        }
        None => CompressWriter::Plain(writer),
    };
    Ok(writer)
}

/// Writer compressing to one of the supported formats
pub enum CompressWriter<W: Write> {
    Plain(W),
    Bzip2(BzEncoder<W>),
    Gzip(GzEncoder<W>),
    Lz4(lz4::Encoder<W>),
    Zstd(zstd::Encoder<'static, W>),
}

impl<W: Write> CompressWriter<W> {
    /// Write the end of the compressed stream and return the flushed
    /// underlying writer
    pub fn finish(self) -> std::io::Result<W> {
        use CompressWriter::*;
        let mut writer = match self {
            Plain(w) => w,
            Bzip2(enc) => enc.finish()?,
            Gzip(enc) => enc.finish()?,
            Lz4(enc) => {
                let (w, res) = enc.finish();
                res?;
                w
            }
            Zstd(enc) => enc.finish()?,
        };
        writer.flush()?;
        Ok(writer)
    }
}

impl<W: Write> Write for CompressWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        use CompressWriter::*;
        match self {
            Plain(w) => w.write(buf),
            Bzip2(enc) => enc.write(buf),
            Gzip(enc) => enc.write(buf),
            Lz4(enc) => enc.write(buf),
            Zstd(enc) => enc.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        use CompressWriter::*;
        match self {
            Plain(w) => w.flush(),
            Bzip2(enc) => enc.flush(),
            Gzip(enc) => enc.flush(),
            Lz4(enc) => enc.flush(),
            Zstd(enc) => enc.flush(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseCompressionErr {
    #[error("Unknown compression algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("Level {1} not supported for {0} compression")]
    UnsupportedLevel(String, String),
}

lazy_static! {
    static ref COMPRESSION_RE: Regex =
        Regex::new(r"^(?P<algo>[[:alnum:]]+)(?P<lvl>_\d+)?$")
            .expect("valid compression regex");
}

fn parse_level(
    algo: &str,
    lvl: Option<&str>,
    max: u8,
    default: u8,
) -> Result<u8, ParseCompressionErr> {
    let Some(lvl) = lvl else {
        return Ok(default);
    };
    match lvl[1..].parse::<u8>() {
        Ok(l) if l <= max => Ok(l),
        _ => Err(ParseCompressionErr::UnsupportedLevel(
            algo.to_owned(),
            lvl.to_owned(),
        )),
    }
}

impl FromStr for Compression {
    type Err = ParseCompressionErr;

    /// Parse `algo` or `algo_level`, e.g. `bz2`, `gzip_9`, `zstd_3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Compression::*;
        use ParseCompressionErr::*;

        let lower_case = s.to_ascii_lowercase();
        let Some(captures) = COMPRESSION_RE.captures(&lower_case) else {
            return Err(UnknownAlgorithm(s.to_owned()));
        };
        let algo = &captures["algo"];
        let lvl = captures.name("lvl").map(|l| l.as_str());
        match algo {
            "bzip2" | "bz2" => {
                if let Some(lvl) = lvl {
                    Err(UnsupportedLevel(algo.into(), lvl.to_owned()))
                } else {
                    Ok(Bzip2)
                }
            }
            "gzip" | "gz" => {
                parse_level(algo, lvl, 9, GZIP_DEFAULT_LEVEL).map(Gzip)
            }
            "lz4" => parse_level(algo, lvl, 16, LZ4_DEFAULT_LEVEL).map(Lz4),
            "zstd" | "zstandard" => {
                parse_level(algo, lvl, 19, ZSTD_DEFAULT_LEVEL).map(Zstd)
            }
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}
