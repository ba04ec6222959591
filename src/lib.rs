//! UTF-8 and GB18030 codecs behind one [`Codec`] contract.
//!
//! ```
//! use charset::{Codec, Gb18030, Utf8};
//!
//! let points = Utf8.decode("我是中国人".as_bytes()).unwrap();
//! assert_eq!(points, [0x6211, 0x662F, 0x4E2D, 0x56FD, 0x4EBA]);
//!
//! // GB18030 values are byte patterns, see `Gb18030`.
//! assert_eq!(Gb18030.decode(&[0xCE, 0xD2]).unwrap(), [0xCED2]);
//! assert!(Gb18030.decode(&[0xFF]).is_err());
//! ```

mod codec;
mod error;
mod gb18030;
mod utf8;

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use itertools::Itertools;
use tracing::info;

pub use codec::{points, Codec, Encoding};
pub use error::{DecodingError, EncodingError, InvalidValue, UnknownEncoding};
pub use gb18030::Gb18030;
pub use utf8::Utf8;

/// Encode and decode UTF-8 and GB18030.
#[derive(Parser, Debug)]
#[command(name = "charset", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode files and list their code points
    Decode {
        /// Encoding of the files (utf-8 or gb18030)
        #[arg(short, long, default_value_t)]
        encoding: Encoding,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Encode text and print the bytes in hexadecimal
    Encode {
        /// Target encoding (utf-8 or gb18030)
        #[arg(short, long, default_value_t)]
        encoding: Encoding,

        /// Read the inputs as one sequence of hexadecimal values (`6211`, `U+6211`, `0xCED2`)
        #[arg(long)]
        points: bool,

        #[arg(required = true)]
        input: Vec<String>,
    },
}

/// Runs the command line `argv` (without the program name), writing results to `out`.
///
/// A file that cannot be read or decoded is reported on its own line and the
/// remaining files are still processed. Encoding stops at the first error.
pub fn charset<I, T, W>(argv: I, out: &mut W) -> Result<(), Box<dyn std::error::Error>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
    W: Write,
{
    let program = std::iter::once(OsString::from("charset"));
    let cli = Cli::try_parse_from(program.chain(argv.into_iter().map(Into::into)))?;
    match cli.command {
        Command::Decode { encoding, files } => decode_files(encoding, &files, out),
        Command::Encode {
            encoding,
            points,
            input,
        } => {
            if points {
                let values = input
                    .iter()
                    .flat_map(|argument| argument.split(','))
                    .filter(|value| !value.is_empty())
                    .map(parse_value)
                    .collect::<Result<Vec<_>, _>>()?;
                writeln!(out, "{}", hex(&encoding.encode(&values)?))?;
            } else {
                for text in &input {
                    writeln!(out, "{}", hex(&encoding.encode(&codec::points(text))?))?;
                }
            }
            Ok(())
        }
    }
}

fn decode_files<W: Write>(
    encoding: Encoding,
    files: &[PathBuf],
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    for path in files {
        write!(out, "{}: ", path.display())?;
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(error) => {
                writeln!(out, "{error}")?;
                continue;
            }
        };
        match encoding.decode(&bytes) {
            Ok(points) => {
                info!(path = %path.display(), %encoding, points = points.len(), "decoded");
                writeln!(out, "{} code points", points.len())?;
                for value in points {
                    writeln!(out, "{}", describe(encoding, value))?;
                }
            }
            Err(error) => writeln!(out, "{error}")?,
        }
    }
    Ok(())
}

/// `U+6211 '我'` for Unicode, the raw byte pattern such as `0xCED2` for GB18030.
fn describe(encoding: Encoding, value: u32) -> String {
    match encoding {
        Encoding::Utf8 => match char::from_u32(value).filter(|c| !c.is_control()) {
            Some(c) => format!("U+{value:04X} '{c}'"),
            None => format!("U+{value:04X}"),
        },
        Encoding::Gb18030 => format!("{value:#04X}"),
    }
}

fn parse_value(text: &str) -> Result<u32, InvalidValue> {
    let digits = ["U+", "u+", "0x", "0X"]
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .unwrap_or(text);
    u32::from_str_radix(digits, 16).map_err(|_| InvalidValue(text.to_owned()))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02X}")).join(" ")
}
