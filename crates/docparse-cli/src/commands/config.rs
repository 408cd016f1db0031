use docparse_config::ParserConfig;

pub fn run(config: &ParserConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Print as YAML for readability
    let yaml = config.to_yaml()?;
    println!("{}", yaml);

    Ok(())
}
