// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with *some* **formatted** content\nover two lines.\n\n<!-- editor marker -->\n\n- Bullet point\n  - Nested item with ![icon](icon.png)\n- Another item\n\n```rust\nfn example() {}\n```\n\n";
    base.repeat(size)
}
