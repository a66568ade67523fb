use graph_refs_macros::Referable;

#[derive(Referable)]
struct Wrapper<T> {
    inner: T,
}

fn main() {}
