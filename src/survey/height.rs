use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub struct HeightWeight {
    pub feet: u32,
    pub inches: u32,
    pub weight: f64,
}

impl HeightWeight {
    pub fn parse(raw: &str) -> Option<Self> {
        let re = Regex::new(r"^\s*(\d+)-(\d+),(\d+(?:\.\d+)?)\s*$").expect("regex");
        let caps = re.captures(raw)?;
        Some(Self {
            feet: caps[1].parse().ok()?,
            inches: caps[2].parse().ok()?,
            weight: caps[3].parse().ok()?,
        })
    }

    pub fn composite(&self) -> String {
        format!("{}-{},{}", self.feet, self.inches, self.weight)
    }

    pub fn problem(&self) -> Option<&'static str> {
        if !(1..=8).contains(&self.feet) {
            return Some("Feet must be between 1 and 8");
        }
        if self.inches > 11 {
            return Some("Inches must be between 0 and 11");
        }
        if self.weight <= 0.0 {
            return Some("Weight must be greater than 0");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::HeightWeight;

    #[test]
    fn parses_composite() {
        let hw = HeightWeight::parse("5-10,180").expect("parse");
        assert_eq!((hw.feet, hw.inches), (5, 10));
        assert_eq!(hw.composite(), "5-10,180");
        assert!(hw.problem().is_none());
    }

    #[test]
    fn flags_out_of_range_parts() {
        let hw = HeightWeight::parse("5-12,150.5").expect("parse");
        assert_eq!(hw.problem(), Some("Inches must be between 0 and 11"));
        assert!(HeightWeight::parse("five ten").is_none());
    }
}
