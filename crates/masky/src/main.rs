fn main() {
    masky::run();
}
