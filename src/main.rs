fn main() {
    thriftstub::cli::run();
}
