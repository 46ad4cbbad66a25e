const WIDTH: usize = 0x10;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Line<'a> {
    offset: usize,
    data: &'a [u8],
}

pub fn printable(chr: u8) -> Option<char> {
    if (0x20..0x7f).contains(&chr) {
        Some(chr as char)
    } else {
        None
    }
}

impl<'a> std::fmt::Display for Line<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:04x}", self.offset)?;

        for i in 0..WIDTH {
            if i % 8 == 0 {
                write!(f, " ")?;
            }
            if i < self.data.len() {
                write!(f, " {:02x}", self.data[i])?;
            } else {
                write!(f, "   ")?;
            }
        }

        write!(f, "  |")?;

        for b in self.data {
            write!(f, "{}", printable(*b).unwrap_or('.'))?;
        }

        write!(f, "|")
    }
}

pub fn hexdump_iter(data: &[u8]) -> impl Iterator<Item = Line<'_>> {
    data.chunks(WIDTH).enumerate().map(|(i, data)| Line {
        offset: i * WIDTH,
        data,
    })
}

pub fn hexdump(data: &[u8]) {
    for line in hexdump_iter(data) {
        println!("{}", line);
    }
}

pub fn hexdump_prefix(prefix: &str, data: &[u8]) {
    for line in hexdump_iter(data) {
        println!("{}{}", prefix, line);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn format_lines() {
        let data: Vec<u8> = (0x41..0x41 + 0x12).collect();
        let lines: Vec<String> = hexdump_iter(&data).map(|l| l.to_string()).collect();
        assert_eq!(
            lines,
            [
                "0000  41 42 43 44 45 46 47 48  49 4a 4b 4c 4d 4e 4f 50  |ABCDEFGHIJKLMNOP|",
                "0010  51 52                                             |QR|",
            ]
        );
    }

    #[test]
    fn unprintable() {
        let line = hexdump_iter(b"\x10a\x03").next().unwrap().to_string();
        assert!(line.ends_with("|.a.|"));
    }

    #[test]
    fn empty() {
        assert_eq!(hexdump_iter(b"").count(), 0);
    }
}
