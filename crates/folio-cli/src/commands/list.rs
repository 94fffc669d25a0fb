use crate::commands::common::{
    filter_posts, format_post_lines, open_coordinator, post_to_list_item, GlobalOptions,
    PostListItem,
};
use crate::error::CliError;

pub async fn run_list(
    limit: usize,
    tag: Option<&str>,
    as_json: bool,
    options: &GlobalOptions,
) -> Result<(), CliError> {
    let coordinator = open_coordinator(options).await?;
    let posts = filter_posts(coordinator.posts(), tag, limit);

    if as_json {
        let json_items = posts
            .iter()
            .map(post_to_list_item)
            .collect::<Vec<PostListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_post_lines(&posts) {
            println!("{line}");
        }
    }

    Ok(())
}
