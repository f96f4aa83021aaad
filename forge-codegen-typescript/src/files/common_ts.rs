//! Shared helpers under `src/common/`.

use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::DatabaseKind;

fn common(base: &Path, file: &str) -> PathBuf {
    base.join("src").join("common").join(file)
}

/// `src/common/pagination.ts`: the `limit`/`offset` query and its clamping.
pub struct PaginationTs;

impl GeneratedFile for PaginationTs {
    fn path(&self, base: &Path) -> PathBuf {
        common(base, "pagination.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        r#"import { Type } from 'class-transformer';
import { IsInt, IsOptional, Min } from 'class-validator';

export const DEFAULT_LIMIT = 50;
export const MAX_LIMIT = 100;

export class PaginationQuery {
  @IsOptional()
  @Type(() => Number)
  @IsInt()
  limit?: number;

  @IsOptional()
  @Type(() => Number)
  @IsInt()
  @Min(0)
  offset?: number;
}

/** Clamps `limit` to 1..=MAX_LIMIT. */
export function page(query: PaginationQuery): { take: number; skip: number } {
  const limit = query.limit ?? DEFAULT_LIMIT;
  return {
    take: Math.min(Math.max(limit, 1), MAX_LIMIT),
    skip: query.offset ?? 0,
  };
}
"#
        .to_string()
    }
}

/// `src/common/mapping.ts`: helpers for building partial entities from DTOs.
pub struct MappingTs;

impl GeneratedFile for MappingTs {
    fn path(&self, base: &Path) -> PathBuf {
        common(base, "mapping.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        r#"/** Drops undefined values so absent fields keep their default or current value. */
export function compact<T extends object>(value: T): Partial<T> {
  return Object.fromEntries(
    Object.entries(value).filter(([, field]) => field !== undefined),
  ) as Partial<T>;
}
"#
        .to_string()
    }
}

/// `src/common/transformers.ts`: column value transformers.
pub struct TransformersTs;

impl GeneratedFile for TransformersTs {
    fn path(&self, base: &Path) -> PathBuf {
        common(base, "transformers.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        r#"import { ValueTransformer } from 'typeorm';

/** Drivers return DECIMAL columns as strings. */
export const decimalTransformer: ValueTransformer = {
  to: (value?: number | null) => value,
  from: (value?: string | null) =>
    value === null || value === undefined ? value : Number(value),
};
"#
        .to_string()
    }
}

/// `src/common/query-failed.filter.ts`: maps constraint violations to
/// 409 and 422 responses.
pub struct QueryFailedFilterTs {
    pub database: DatabaseKind,
}

impl QueryFailedFilterTs {
    fn classify(&self) -> &'static str {
        match self.database {
            DatabaseKind::Postgres => {
                r#"function statusOf(error: QueryFailedError): HttpStatus {
  const { code } = error.driverError as { code?: string };
  switch (code) {
    case '23505':
      return HttpStatus.CONFLICT;
    case '23503':
      return HttpStatus.UNPROCESSABLE_ENTITY;
    default:
      return HttpStatus.INTERNAL_SERVER_ERROR;
  }
}"#
            }
            DatabaseKind::Mysql => {
                r#"function statusOf(error: QueryFailedError): HttpStatus {
  const { code } = error.driverError as { code?: string };
  switch (code) {
    case 'ER_DUP_ENTRY':
      return HttpStatus.CONFLICT;
    case 'ER_NO_REFERENCED_ROW_2':
    case 'ER_ROW_IS_REFERENCED_2':
      return HttpStatus.UNPROCESSABLE_ENTITY;
    default:
      return HttpStatus.INTERNAL_SERVER_ERROR;
  }
}"#
            }
            DatabaseKind::Sqlite => {
                r#"function statusOf(error: QueryFailedError): HttpStatus {
  const message = String((error.driverError as { message?: string }).message ?? '');
  if (message.includes('UNIQUE constraint failed')) {
    return HttpStatus.CONFLICT;
  }
  if (message.includes('FOREIGN KEY constraint failed')) {
    return HttpStatus.UNPROCESSABLE_ENTITY;
  }
  return HttpStatus.INTERNAL_SERVER_ERROR;
}"#
            }
        }
    }
}

impl GeneratedFile for QueryFailedFilterTs {
    fn path(&self, base: &Path) -> PathBuf {
        common(base, "query-failed.filter.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        format!(
            r#"import {{ ArgumentsHost, Catch, ExceptionFilter, HttpStatus, Logger }} from '@nestjs/common';
import {{ Response }} from 'express';
import {{ QueryFailedError }} from 'typeorm';

const MESSAGES: Partial<Record<HttpStatus, string>> = {{
  [HttpStatus.CONFLICT]: 'a row with the same unique value already exists',
  [HttpStatus.UNPROCESSABLE_ENTITY]: 'a referenced row does not exist or is still referenced',
}};

{classify}

@Catch(QueryFailedError)
export class QueryFailedFilter implements ExceptionFilter {{
  private readonly logger = new Logger(QueryFailedFilter.name);

  catch(exception: QueryFailedError, host: ArgumentsHost): void {{
    const response = host.switchToHttp().getResponse<Response>();
    const status = statusOf(exception);
    const message = MESSAGES[status];
    if (message === undefined) {{
      this.logger.error(exception.message, exception.stack);
    }}
    response.status(status).json({{
      statusCode: status,
      message: message ?? 'internal server error',
    }});
  }}
}}
"#,
            classify = self.classify()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_codes_per_database() {
        let pg = QueryFailedFilterTs {
            database: DatabaseKind::Postgres,
        }
        .render();
        assert!(pg.contains("case '23505':"));

        let mysql = QueryFailedFilterTs {
            database: DatabaseKind::Mysql,
        }
        .render();
        assert!(mysql.contains("case 'ER_DUP_ENTRY':"));
        assert!(!mysql.contains("23505"));

        let sqlite = QueryFailedFilterTs {
            database: DatabaseKind::Sqlite,
        }
        .render();
        assert!(sqlite.contains("UNIQUE constraint failed"));
    }
}
