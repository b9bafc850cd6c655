use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A zero-based (row, column) position in a grid.
/// Displays and serializes in spreadsheet A1 notation, e.g. `RowCol(1, 3)` is `D2`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RowCol(pub usize, pub usize);

impl RowCol {
    pub fn new(row: usize, col: usize) -> Self {
        Self(row, col)
    }

    pub fn row(&self) -> usize {
        self.0
    }

    pub fn col(&self) -> usize {
        self.1
    }
}

/// Converts a zero-based column index to its letter name: 0 -> A, 25 -> Z, 26 -> AA.
fn column_letters(mut col: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.iter().rev().collect()
}

impl fmt::Display for RowCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.1), self.0 + 1)
    }
}

impl FromStr for RowCol {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Expected format: "B4"
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| anyhow::anyhow!("Cell reference must end in a row number, got: {s}"))?;
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() {
            anyhow::bail!("Cell reference must start with a column letter, got: {s}");
        }

        let mut col: usize = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                anyhow::bail!("Invalid column letter '{c}' in cell reference: {s}");
            }
            col = col * 26 + (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        }

        let row = digits
            .parse::<usize>()
            .map_err(|e| anyhow::anyhow!("Invalid row number: {e}"))?;
        if row == 0 {
            anyhow::bail!("Row numbers start at 1, got: {s}");
        }

        Ok(RowCol(row - 1, col - 1))
    }
}

impl Serialize for RowCol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RowCol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RowCol::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_col_display() {
        assert_eq!(RowCol::new(0, 0).to_string(), "A1");
        assert_eq!(RowCol::new(1, 3).to_string(), "D2");
        assert_eq!(RowCol::new(9, 25).to_string(), "Z10");
        assert_eq!(RowCol::new(0, 26).to_string(), "AA1");
        assert_eq!(RowCol::new(0, 701).to_string(), "ZZ1");
        assert_eq!(RowCol::new(0, 702).to_string(), "AAA1");
    }

    #[test]
    fn test_row_col_from_str() {
        let key: RowCol = "B4".parse().unwrap();
        assert_eq!(key, RowCol::new(3, 1));

        let key: RowCol = "aa10".parse().unwrap();
        assert_eq!(key, RowCol::new(9, 26));

        let key: RowCol = " ZZ1 ".parse().unwrap();
        assert_eq!(key, RowCol::new(0, 701));
    }

    #[test]
    fn test_row_col_from_str_invalid() {
        assert!("4".parse::<RowCol>().is_err()); // Missing column
        assert!("B".parse::<RowCol>().is_err()); // Missing row
        assert!("B0".parse::<RowCol>().is_err()); // Rows are 1-based
        assert!("B-1".parse::<RowCol>().is_err());
        assert!("B4C".parse::<RowCol>().is_err());
    }

    #[test]
    fn test_row_col_serde() {
        let serialized = serde_json::to_string(&RowCol::new(7, 2)).unwrap();
        assert_eq!(serialized, r#""C8""#);
        let key: RowCol = serde_json::from_str(&serialized).unwrap();
        assert_eq!(key, RowCol::new(7, 2));
    }
}
