use graph_refs_macros::Referable;

#[derive(Referable)]
enum Shape {
    Circle,
    Square,
}

fn main() {}
