use graph_refs_macros::Referable;

#[derive(Referable)]
struct Pair(String, String);

fn main() {}
