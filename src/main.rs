use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    adreport::cli::run(std::env::args().skip(1))
}
