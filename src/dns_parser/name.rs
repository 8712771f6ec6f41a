use std::borrow::Cow;
use std::fmt;
use std::io;
use std::str::from_utf8;

use byteorder::WriteBytesExt;

use super::Error;

/// Longest label allowed in a domain name
pub const MAX_LABEL_LENGTH: usize = 63;
/// Longest encoded domain name, including length bytes and the root label
pub const MAX_NAME_LENGTH: usize = 255;
/// Upper bound on labels plus pointer jumps followed while scanning one name
pub const MAX_NAME_HOPS: usize = 128;

const POINTER_MASK: u8 = 0b1100_0000;

/// A domain name in dotted form
///
/// Names supplied by the user are borrowed as given (minus a trailing dot),
/// names scanned out of a packet own their fully decompressed text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name<'a>(Cow<'a, str>);

impl<'a> Name<'a> {
    /// Validates a name typed by the user
    ///
    /// Every label must be 1 to 63 ASCII bytes and the encoded name may not
    /// exceed 255 bytes. A single trailing dot is accepted.
    pub fn from_str<T: Into<Cow<'a, str>>>(name: T) -> Result<Name<'a>, Error> {
        let name = name.into();
        let trimmed = match name.strip_suffix('.') {
            Some(stripped) => stripped.len(),
            None => name.len(),
        };
        let name = match name {
            Cow::Borrowed(s) => Cow::Borrowed(&s[..trimmed]),
            Cow::Owned(mut s) => {
                s.truncate(trimmed);
                Cow::Owned(s)
            }
        };

        if !name.is_ascii() {
            return Err(Error::InvalidName(name.into_owned()));
        }
        let mut encoded_len = 1;
        for label in name.split('.') {
            if label.is_empty() || label.len() > MAX_LABEL_LENGTH {
                return Err(Error::InvalidName(name.into_owned()));
            }
            encoded_len += label.len() + 1;
        }
        if encoded_len > MAX_NAME_LENGTH {
            return Err(Error::InvalidName(name.into_owned()));
        }

        Ok(Name(name))
    }

    /// Reads a possibly compressed name starting at `pos` in `original`
    ///
    /// Returns the name and the offset right after the name as it appears at
    /// `pos`: after the terminating zero byte, or after the first pointer if
    /// the name is compressed. Bytes visited by following pointers never move
    /// the returned offset.
    pub fn scan(original: &[u8], pos: usize) -> Result<(Name<'static>, usize), Error> {
        let mut text = String::new();
        let mut encoded_len = 1;
        let mut cursor = pos;
        let mut end = None;

        for _ in 0..MAX_NAME_HOPS {
            let byte = *original
                .get(cursor)
                .ok_or(Error::MalformedMessage("domain name runs past end of packet"))?;

            if byte == 0 {
                return Ok((Name(Cow::Owned(text)), end.unwrap_or(cursor + 1)));
            } else if byte & POINTER_MASK == POINTER_MASK {
                let low = *original
                    .get(cursor + 1)
                    .ok_or(Error::MalformedMessage("compression pointer is cut short"))?;
                let off = (usize::from(byte & !POINTER_MASK) << 8) | usize::from(low);
                if off >= original.len() {
                    return Err(Error::MalformedMessage(
                        "compression pointer targets past end of packet",
                    ));
                }
                if end.is_none() {
                    end = Some(cursor + 2);
                }
                cursor = off;
            } else if byte & POINTER_MASK == 0 {
                let start = cursor + 1;
                let stop = start + usize::from(byte);
                let label = original
                    .get(start..stop)
                    .ok_or(Error::MalformedMessage("label runs past end of packet"))?;
                if !label.is_ascii() {
                    return Err(Error::MalformedMessage("label is not ascii"));
                }
                encoded_len += label.len() + 1;
                if encoded_len > MAX_NAME_LENGTH {
                    return Err(Error::MalformedMessage("domain name is too long"));
                }
                if !text.is_empty() {
                    text.push('.');
                }
                // checked above, ascii is always valid utf-8
                text.push_str(from_utf8(label).unwrap_or_default());
                cursor = stop;
            } else {
                return Err(Error::MalformedMessage("label has unknown label format"));
            }
        }

        Err(Error::MalformedMessage("too many labels or compression pointers"))
    }

    /// Number of bytes the uncompressed encoding of this name takes
    pub fn encoded_len(&self) -> usize {
        if self.0.is_empty() {
            return 1;
        }
        self.0.len() + 2
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|label| !label.is_empty())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_owned(self) -> Name<'static> {
        Name(Cow::Owned(self.0.into_owned()))
    }

    pub fn write_to<T: io::Write>(&self, writer: &mut T) -> io::Result<()> {
        for label in self.labels() {
            writer.write_u8(label.len() as u8)?;
            writer.write_all(label.as_bytes())?;
        }
        writer.write_u8(0)
    }
}

impl<'a> fmt::Display for Name<'a> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}
