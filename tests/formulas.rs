use undertaker::{
    checker::SatChecker,
    cnf::{assumptions::AssumptionMap, builder::CnfBuilder, Formula},
    config::Config,
    expr::parse::Dialect,
    kconfig::{symbols::SymbolTranslator, SymbolTable},
    structures::symbol::SymbolType,
};

const SYMBOLS: &str = r#"{
  "symbols": [
    { "name": "USB", "type": "tristate", "prompts": [{ "text": "USB support" }] },
    { "name": "USB_DEBUG", "type": "boolean", "prompts": [{ "text": "Debugging" }],
      "dependencies": [{ "symbol": "USB" }] },
    { "name": "USB_NAME", "type": "string" }
  ]
}"#;

fn translated(config: &Config) -> Formula {
    let table = SymbolTable::from_json(SYMBOLS.as_bytes()).unwrap();
    let mut formula = Formula::from_config(config);
    let stats = SymbolTranslator::new(CnfBuilder::new(&mut formula, config.constant_policy.value))
        .translate(&table)
        .unwrap();
    assert_eq!(stats.symbols, 3);
    formula
}

mod models {
    use super::*;

    #[test]
    fn written_formulas_are_read_back() {
        let config = Config::default();
        let formula = translated(&config);

        let mut text = Vec::default();
        formula.write(&mut text).unwrap();

        let mut read = Formula::default();
        read.read(text.as_slice()).unwrap();
        assert_eq!(read.var_count(), formula.var_count());
        assert_eq!(read.clauses(), formula.clauses());
        assert_eq!(read.symbol_type("USB"), SymbolType::Tristate);
        assert_eq!(read.symbol_type("USB_NAME"), SymbolType::String);
        assert_eq!(read.associated_symbol("CONFIG_USB_MODULE"), Some("USB"));
    }
}

mod configurations {
    use super::*;

    #[test]
    fn satisfiable() {
        let config = Config::default();
        let formula = translated(&config);

        let assumptions = AssumptionMap::read(&formula, "CONFIG_USB=m\n".as_bytes()).unwrap();
        let mut checker = SatChecker::new(&config).with_base(Some(&formula));
        checker.push(Dialect::Cpp, "CONFIG_USB_DEBUG");
        assert_eq!(checker.check_assuming(&assumptions), Ok(true));

        let configuration = checker.configuration();
        assert!(configuration.contains(&"CONFIG_USB=m".to_string()));
        assert!(configuration.contains(&"CONFIG_USB_DEBUG=y".to_string()));
    }

    #[test]
    fn unsatisfiable() {
        let config = Config::default();
        let formula = translated(&config);

        let partial = "# CONFIG_USB is not set\nCONFIG_USB_DEBUG=y\n";
        let assumptions = AssumptionMap::read(&formula, partial.as_bytes()).unwrap();
        let mut checker = SatChecker::new(&config).with_base(Some(&formula));
        assert_eq!(checker.check_assuming(&assumptions), Ok(false));
        assert!(checker.failed_assumptions().contains(&"CONFIG_USB_DEBUG".to_string()));
    }
}
