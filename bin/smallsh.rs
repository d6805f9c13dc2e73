fn main() {
    smallsh::smallsh_main()
}
