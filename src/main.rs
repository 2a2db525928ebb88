mod cli_mode;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    cli_mode::entry_main()
}
