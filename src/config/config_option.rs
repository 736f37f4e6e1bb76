/// A named configuration value, together with the bounds of acceptable values.
#[derive(Clone, Debug)]
pub struct ConfigOption<T> {
    pub name: &'static str,
    pub min: T,
    pub max: T,
    pub value: T,
}

impl<T: Clone + PartialOrd> ConfigOption<T> {
    pub fn min_max(&self) -> (T, T) {
        (self.min.clone(), self.max.clone())
    }

    /// Sets the option to `value` if the value is within bounds, and returns whether the option was set.
    pub fn set(&mut self, value: T) -> bool {
        if value < self.min || self.max < value {
            log::warn!("Value for '{}' out of bounds, ignored", self.name);
            return false;
        }
        self.value = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        let mut option = ConfigOption {
            name: "jobs",
            min: 1,
            max: 8,
            value: 1,
        };
        assert!(option.set(4));
        assert!(!option.set(0));
        assert!(!option.set(9));
        assert_eq!(option.value, 4);
        assert_eq!(option.min_max(), (1, 8));
    }
}
