use dotenv::dotenv;

#[tokio::main]
async fn main() {
    dotenv().ok();
    eventify::run().await;
}
