//! Bundled sample posts shown on first run and whenever the API is down.

use chrono::NaiveDate;

use crate::models::{Post, PostId};

struct Sample {
    id: &'static str,
    title: &'static str,
    excerpt: &'static str,
    content: &'static str,
    author: &'static str,
    date: (i32, u32, u32),
    cover_image: &'static str,
    tags: &'static [&'static str],
    read_time: u32,
}

const SAMPLES: [Sample; 4] = [
    Sample {
        id: "1",
        title: "Exploring concurrent rendering in React 18",
        excerpt: "Concurrent rendering, automatic batching and Suspense improvements that keep interfaces responsive.",
        content: r"## What changed in React 18

React 18 ships a concurrent renderer. Work can be prepared in the background
without blocking the main thread, which means:

- smoother interaction
- better responsiveness
- urgent updates are handled first

### Automatic batching

```typescript
setTimeout(() => {
  setCount(c => c + 1);
  setFlag(f => !f);
  // one re-render, not two
}, 1000);
```

### useTransition

```typescript
const [isPending, startTransition] = useTransition();

function handleChange(e) {
  setInputValue(e.target.value);
  startTransition(() => setSearchQuery(e.target.value));
}
```
",
        author: "Zhang San",
        date: (2026, 1, 8),
        cover_image: "https://images.unsplash.com/photo-1633356122544-f134324a6cee?w=800&h=400&fit=crop",
        tags: &["React", "JavaScript", "Frontend"],
        read_time: 8,
    },
    Sample {
        id: "2",
        title: "Advanced TypeScript type tricks",
        excerpt: "Conditional, mapped and template literal types for stronger type definitions.",
        content: r"## Conditional types

```typescript
type IsString<T> = T extends string ? true : false;
```

## Mapped types

```typescript
type ReadonlyDeep<T> = { readonly [K in keyof T]: ReadonlyDeep<T[K]> };
```

## Template literal types

```typescript
type EventName<T extends string> = `on${Capitalize<T>}`;
```

Combined, these let the compiler check far more of your program.
",
        author: "Li Si",
        date: (2026, 1, 6),
        cover_image: "https://images.unsplash.com/photo-1516116216624-53e697fedbea?w=800&h=400&fit=crop",
        tags: &["TypeScript", "Type systems", "Frontend"],
        read_time: 10,
    },
    Sample {
        id: "3",
        title: "Modern CSS layout techniques",
        excerpt: "From Flexbox to Grid to Container Queries: the essentials of modern CSS layout.",
        content: r"## Flexbox

```css
.row { display: flex; gap: 1rem; align-items: center; }
```

## Grid

```css
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); }
```

## Container queries

```css
@container (min-width: 400px) {
  .card { flex-direction: row; }
}
```
",
        author: "Wang Wu",
        date: (2026, 1, 4),
        cover_image: "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=800&h=400&fit=crop",
        tags: &["CSS", "Layout", "Web design"],
        read_time: 6,
    },
    Sample {
        id: "4",
        title: "Building high-performance web apps",
        excerpt: "Code splitting, caching strategy and rendering budgets for faster web applications.",
        content: r"## Code splitting

```typescript
const Editor = lazy(() => import('./Editor'));
```

## Caching

Serve hashed assets with a long `Cache-Control` lifetime and keep HTML
short-lived.

## Measure first

Track Core Web Vitals (LCP, INP, CLS) before and after every optimization.
",
        author: "Zhao Liu",
        date: (2026, 1, 2),
        cover_image: "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=800&h=400&fit=crop",
        tags: &["Performance", "Web development", "Best practices"],
        read_time: 12,
    },
];

/// The default post sequence, newest first.
#[must_use]
pub fn default_posts() -> Vec<Post> {
    SAMPLES.iter().map(Sample::to_post).collect()
}

impl Sample {
    fn to_post(&self) -> Post {
        let (year, month, day) = self.date;
        Post {
            id: PostId::from(self.id),
            title: self.title.to_string(),
            excerpt: self.excerpt.to_string(),
            content: self.content.to_string(),
            author: self.author.to_string(),
            cover_image: Some(self.cover_image.to_string()),
            tags: self.tags.iter().map(ToString::to_string).collect(),
            read_time: self.read_time,
            date: NaiveDate::from_ymd_opt(year, month, day),
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn four_samples_with_unique_ids() {
        let posts = default_posts();
        assert_eq!(posts.len(), 4);
        let ids = posts.iter().map(|post| post.id.clone()).collect::<HashSet<_>>();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn samples_satisfy_post_invariants() {
        for post in default_posts() {
            assert!(!post.title.trim().is_empty());
            assert!(!post.content.trim().is_empty());
            assert!(post.read_time >= 1);
            assert!(post.tags.iter().all(|tag| !tag.is_empty()));
            assert!(post.date.is_some());
        }
    }

    #[test]
    fn samples_are_newest_first() {
        let dates = default_posts()
            .iter()
            .filter_map(|post| post.date)
            .collect::<Vec<_>>();
        assert!(dates.windows(2).all(|pair| pair[0] > pair[1]));
    }
}
