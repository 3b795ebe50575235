fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging goes to stderr; initialize before the terminal enters the
    // alternate screen so startup problems stay visible.
    env_logger::init();

    attacca::runtime::run()
}
