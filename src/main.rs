use log::error;

#[tokio::main]
async fn main() {
    match video_downloader_lib::run().await {
        // Exit directly: the stdin reader may still be parked on a blocking read
        Ok(()) => std::process::exit(0),
        Err(e) => {
            error!("❌ Error: {e}");
            std::process::exit(1);
        }
    }
}
